// Export OpenAPI specification as JSON
//
// Usage: cargo run --bin export-openapi > docs/openapi.json

use anyhow::Context;
use confhub_control_plane::openapi::ApiDoc;

fn main() -> anyhow::Result<()> {
    let json = ApiDoc::to_json().context("Failed to serialize OpenAPI spec")?;
    println!("{}", json);
    Ok(())
}
