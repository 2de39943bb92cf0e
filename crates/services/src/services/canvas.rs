//! Owner-scoped canvas persistence with graph validation and code generation.

use db::models::{
    canvas::{Canvas, CanvasSummary, CreateCanvas, DEFAULT_CANVAS_NAME, UpdateCanvas},
    move_code::MoveCode,
};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    graph::{GraphValidationError, validate_graph},
    move_generator::generate_move_code,
};

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    InvalidGraph(#[from] GraphValidationError),
    #[error("canvas not found")]
    NotFound,
}

pub struct CanvasService;

impl CanvasService {
    /// Store a new canvas. A blank name falls back to the default and missing
    /// code is generated from the graph.
    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: CreateCanvas,
    ) -> Result<Canvas, CanvasError> {
        validate_graph(&data.nodes, &data.edges)?;

        let name = data
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANVAS_NAME.to_string());
        let move_code = data
            .move_code
            .unwrap_or_else(|| generate_move_code(&data.nodes, &data.edges));

        let mut tx = pool.begin().await?;
        let canvas = Canvas::create(
            &mut *tx,
            Uuid::new_v4(),
            user_id,
            &name,
            &data.nodes,
            &data.edges,
            &move_code,
        )
        .await?;
        Self::remember_code(&mut tx, user_id, &canvas.move_code).await?;
        tx.commit().await?;

        info!(
            canvas_id = %canvas.id,
            user_id = %user_id,
            nodes = canvas.nodes.len(),
            edges = canvas.edges.len(),
            "Created canvas"
        );
        Ok(canvas)
    }

    pub async fn list(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<CanvasSummary>, CanvasError> {
        Ok(Canvas::find_summaries_by_user(pool, user_id).await?)
    }

    pub async fn get(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<Canvas, CanvasError> {
        Canvas::find_by_id_for_user(pool, id, user_id)
            .await?
            .ok_or(CanvasError::NotFound)
    }

    /// Partial update. Absent fields keep their stored value, and so does a
    /// blank name. A graph change without explicit code regenerates the code.
    pub async fn update(
        pool: &SqlitePool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateCanvas,
    ) -> Result<Canvas, CanvasError> {
        let existing = Self::get(pool, user_id, id).await?;

        let graph_changed = data.nodes.is_some() || data.edges.is_some();
        let code_touched = data.move_code.is_some() || graph_changed;

        let name = data
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(existing.name);
        let nodes = data.nodes.unwrap_or(existing.nodes);
        let edges = data.edges.unwrap_or(existing.edges);
        validate_graph(&nodes, &edges)?;

        let move_code = match data.move_code {
            Some(code) => code,
            None if graph_changed => generate_move_code(&nodes, &edges),
            None => existing.move_code,
        };

        let mut tx = pool.begin().await?;
        let canvas = Canvas::update(&mut *tx, id, user_id, &name, &nodes, &edges, &move_code)
            .await?
            .ok_or(CanvasError::NotFound)?;
        if code_touched {
            Self::remember_code(&mut tx, user_id, &canvas.move_code).await?;
        }
        tx.commit().await?;

        debug!(canvas_id = %id, graph_changed, "Updated canvas");
        Ok(canvas)
    }

    pub async fn delete(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<(), CanvasError> {
        let rows = Canvas::delete(pool, id, user_id).await?;
        if rows == 0 {
            return Err(CanvasError::NotFound);
        }
        info!(canvas_id = %id, user_id = %user_id, "Deleted canvas");
        Ok(())
    }

    /// Saved canvases also become the user's latest deployable code. Runs on
    /// the caller's transaction so the canvas write and the code stay in step.
    async fn remember_code(
        conn: &mut SqliteConnection,
        user_id: Uuid,
        code: &str,
    ) -> Result<(), CanvasError> {
        if !code.trim().is_empty() {
            MoveCode::upsert(conn, user_id, code).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{
            canvas::{CanvasEdge, CanvasNode, NodeKind},
            user::User,
        },
    };

    use super::*;

    async fn setup() -> (DBService, Uuid) {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        User::create(&db.pool, user_id, "Owner", "owner@example.com", "h")
            .await
            .unwrap();
        (db, user_id)
    }

    fn graph() -> (Vec<CanvasNode>, Vec<CanvasEdge>) {
        (
            vec![
                CanvasNode::new("p", NodeKind::Party, "Payer"),
                CanvasNode::new("d", NodeKind::Action, "Deposit"),
            ],
            vec![CanvasEdge::new("p", "d")],
        )
    }

    #[tokio::test]
    async fn test_create_defaults_and_generates() {
        let (db, user_id) = setup().await;
        let (nodes, edges) = graph();
        let canvas = CanvasService::create(
            &db.pool,
            user_id,
            CreateCanvas {
                name: Some("   ".into()),
                nodes: nodes.clone(),
                edges: edges.clone(),
                move_code: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(canvas.name, DEFAULT_CANVAS_NAME);
        assert_eq!(canvas.move_code, generate_move_code(&nodes, &edges));

        let latest = MoveCode::find_by_user_id(&db.pool, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.code, canvas.move_code);
    }

    async fn break_move_codes(db: &DBService) {
        sqlx::query("DROP TABLE move_codes")
            .execute(&db.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_rolls_back_when_code_cannot_be_saved() {
        let (db, user_id) = setup().await;
        break_move_codes(&db).await;

        let (nodes, edges) = graph();
        let result = CanvasService::create(
            &db.pool,
            user_id,
            CreateCanvas {
                name: Some("Escrow".into()),
                nodes,
                edges,
                move_code: None,
            },
        )
        .await;

        assert!(matches!(result, Err(CanvasError::Database(_))));
        assert!(CanvasService::list(&db.pool, user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rolls_back_when_code_cannot_be_saved() {
        let (db, user_id) = setup().await;
        let (nodes, edges) = graph();
        let canvas = CanvasService::create(
            &db.pool,
            user_id,
            CreateCanvas {
                name: Some("Before".into()),
                nodes,
                edges,
                move_code: None,
            },
        )
        .await
        .unwrap();
        break_move_codes(&db).await;

        let result = CanvasService::update(
            &db.pool,
            user_id,
            canvas.id,
            UpdateCanvas {
                name: Some("After".into()),
                move_code: Some("module Changed {}".into()),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(result, Err(CanvasError::Database(_))));
        let stored = CanvasService::get(&db.pool, user_id, canvas.id).await.unwrap();
        assert_eq!(stored.name, "Before");
        assert_eq!(stored.move_code, canvas.move_code);
    }

    #[tokio::test]
    async fn test_create_rejects_dangling_edge() {
        let (db, user_id) = setup().await;
        let err = CanvasService::create(
            &db.pool,
            user_id,
            CreateCanvas {
                name: Some("Broken".into()),
                nodes: vec![CanvasNode::new("a", NodeKind::Role, "Admin")],
                edges: vec![CanvasEdge::new("a", "b")],
                move_code: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CanvasError::InvalidGraph(GraphValidationError::DanglingEdge { .. })
        ));
        assert!(CanvasService::list(&db.pool, user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_blank_name_keeps_previous() {
        let (db, user_id) = setup().await;
        let created = CanvasService::create(
            &db.pool,
            user_id,
            CreateCanvas {
                name: Some("Escrow".into()),
                ..CreateCanvas::default()
            },
        )
        .await
        .unwrap();

        let updated = CanvasService::update(
            &db.pool,
            user_id,
            created.id,
            UpdateCanvas {
                name: Some(String::new()),
                ..UpdateCanvas::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Escrow");
        assert_eq!(updated.move_code, created.move_code);
    }

    #[tokio::test]
    async fn test_update_graph_regenerates_code() {
        let (db, user_id) = setup().await;
        let created = CanvasService::create(
            &db.pool,
            user_id,
            CreateCanvas {
                name: Some("Vault".into()),
                move_code: Some("// hand written".into()),
                ..CreateCanvas::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(created.move_code, "// hand written");

        let (nodes, edges) = graph();
        let updated = CanvasService::update(
            &db.pool,
            user_id,
            created.id,
            UpdateCanvas {
                nodes: Some(nodes.clone()),
                edges: Some(edges.clone()),
                ..UpdateCanvas::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.nodes, nodes);
        assert!(updated.move_code.contains("public entry fun deposit("));
    }

    #[tokio::test]
    async fn test_update_validates_merged_graph() {
        let (db, user_id) = setup().await;
        let (nodes, edges) = graph();
        let created = CanvasService::create(
            &db.pool,
            user_id,
            CreateCanvas {
                name: Some("Flow".into()),
                nodes,
                edges,
                move_code: None,
            },
        )
        .await
        .unwrap();

        // Dropping the nodes strands the stored edge
        let err = CanvasService::update(
            &db.pool,
            user_id,
            created.id,
            UpdateCanvas {
                nodes: Some(Vec::new()),
                ..UpdateCanvas::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CanvasError::InvalidGraph(_)));
    }

    #[tokio::test]
    async fn test_cross_owner_is_not_found() {
        let (db, owner) = setup().await;
        let intruder = Uuid::new_v4();
        User::create(&db.pool, intruder, "Eve", "eve@example.com", "h")
            .await
            .unwrap();

        let canvas = CanvasService::create(&db.pool, owner, CreateCanvas::default())
            .await
            .unwrap();

        assert!(matches!(
            CanvasService::get(&db.pool, intruder, canvas.id).await,
            Err(CanvasError::NotFound)
        ));
        assert!(matches!(
            CanvasService::update(&db.pool, intruder, canvas.id, UpdateCanvas::default()).await,
            Err(CanvasError::NotFound)
        ));
        assert!(matches!(
            CanvasService::delete(&db.pool, intruder, canvas.id).await,
            Err(CanvasError::NotFound)
        ));
        assert!(CanvasService::get(&db.pool, owner, canvas.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (db, user_id) = setup().await;
        let canvas = CanvasService::create(&db.pool, user_id, CreateCanvas::default())
            .await
            .unwrap();
        CanvasService::delete(&db.pool, user_id, canvas.id).await.unwrap();
        assert!(matches!(
            CanvasService::get(&db.pool, user_id, canvas.id).await,
            Err(CanvasError::NotFound)
        ));
        assert!(matches!(
            CanvasService::delete(&db.pool, user_id, canvas.id).await,
            Err(CanvasError::NotFound)
        ));
    }
}
