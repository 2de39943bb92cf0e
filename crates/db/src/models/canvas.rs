use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

pub const DEFAULT_CANVAS_NAME: &str = "Untitled Canvas";

/// Kind of element a node represents on the editor canvas
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Role,
    Action,
    Contract,
    Observation,
    Value,
    Bound,
    Token,
    Party,
    Payee,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Connection handle counts per side of a node shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct Handles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
}

/// Editor inputs may send numeric fields as JSON numbers; they are kept as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

/// Properties edited through the node dialog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    /// Kind echoed by the editor inside `data`; informational only.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handles: Option<Handles>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl CanvasNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Position::default(),
            data: NodeData {
                label: label.into(),
                ..NodeData::default()
            },
        }
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CanvasEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
}

impl CanvasEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("e{}-{}", source, target),
            source,
            target,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
    pub move_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape; nodes and edges are stored as JSON text.
#[derive(FromRow)]
struct CanvasRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    nodes: String,
    edges: String,
    move_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CanvasRow> for Canvas {
    type Error = sqlx::Error;

    fn try_from(row: CanvasRow) -> Result<Self, Self::Error> {
        let nodes = serde_json::from_str(&row.nodes).map_err(|e| sqlx::Error::Decode(e.into()))?;
        let edges = serde_json::from_str(&row.edges).map_err(|e| sqlx::Error::Decode(e.into()))?;
        Ok(Canvas {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            nodes,
            edges,
            move_code: row.move_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// List entry; the graph itself is not loaded
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a canvas
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateCanvas {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<CanvasNode>,
    #[serde(default)]
    pub edges: Vec<CanvasEdge>,
    #[serde(default)]
    pub move_code: Option<String>,
}

/// Request body for a partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCanvas {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Option<Vec<CanvasNode>>,
    #[serde(default)]
    pub edges: Option<Vec<CanvasEdge>>,
    #[serde(default)]
    pub move_code: Option<String>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(e.into()))
}

impl Canvas {
    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        name: &str,
        nodes: &[CanvasNode],
        edges: &[CanvasEdge],
        move_code: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let row = sqlx::query_as::<_, CanvasRow>(
            r#"INSERT INTO canvases (id, user_id, name, nodes, edges, move_code, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
               RETURNING id, user_id, name, nodes, edges, move_code, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(to_json(&nodes)?)
        .bind(to_json(&edges)?)
        .bind(move_code)
        .bind(now)
        .fetch_one(executor)
        .await?;
        row.try_into()
    }

    /// Scoped lookup; another user's canvas is indistinguishable from a missing one.
    pub async fn find_by_id_for_user(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CanvasRow>(
            r#"SELECT id, user_id, name, nodes, edges, move_code, created_at, updated_at
               FROM canvases
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(Canvas::try_from)
        .transpose()
    }

    pub async fn find_summaries_by_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<CanvasSummary>, sqlx::Error> {
        sqlx::query_as::<_, CanvasSummary>(
            r#"SELECT id, name, created_at, updated_at
               FROM canvases
               WHERE user_id = $1
               ORDER BY updated_at DESC, rowid DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        name: &str,
        nodes: &[CanvasNode],
        edges: &[CanvasEdge],
        move_code: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, CanvasRow>(
            r#"UPDATE canvases
               SET name = $3, nodes = $4, edges = $5, move_code = $6, updated_at = $7
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, name, nodes, edges, move_code, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(to_json(&nodes)?)
        .bind(to_json(&edges)?)
        .bind(move_code)
        .bind(now)
        .fetch_optional(executor)
        .await?
        .map(Canvas::try_from)
        .transpose()
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM canvases WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
