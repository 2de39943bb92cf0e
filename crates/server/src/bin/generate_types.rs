use std::{env, fs, path::PathBuf};

use db::models::{
    canvas::{
        Canvas, CanvasEdge, CanvasNode, CanvasSummary, CreateCanvas, Handles, NodeData, NodeKind,
        Position, UpdateCanvas,
    },
    move_code::{MoveCode, SaveMoveCode},
    user::User,
};
use services::services::{
    auth::{AuthResponse, LoginRequest, RegisterRequest},
    deploy::DeployOutcome,
    move_generator::{GenerateRequest, GenerationReport, ManyToOne, OneToMany, Relationships},
};
use ts_rs::TS;
use utils::response::ApiResponse;

fn generate_types_content() -> String {
    let decls = [
        ApiResponse::<()>::decl(),
        NodeKind::decl(),
        Position::decl(),
        Handles::decl(),
        NodeData::decl(),
        CanvasNode::decl(),
        CanvasEdge::decl(),
        Canvas::decl(),
        CanvasSummary::decl(),
        CreateCanvas::decl(),
        UpdateCanvas::decl(),
        MoveCode::decl(),
        SaveMoveCode::decl(),
        User::decl(),
        RegisterRequest::decl(),
        LoginRequest::decl(),
        AuthResponse::decl(),
        OneToMany::decl(),
        ManyToOne::decl(),
        Relationships::decl(),
        GenerateRequest::decl(),
        GenerationReport::decl(),
        DeployOutcome::decl(),
    ];

    let body = decls
        .iter()
        .map(|d| format!("export {}", d.trim_start_matches("export ")))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "// This file was generated by `cargo run --bin generate_types`. Do not edit.\n\n{}\n",
        body
    )
}

fn main() -> anyhow::Result<()> {
    let content = generate_types_content();

    match env::args().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            println!("Wrote TypeScript types to {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}
