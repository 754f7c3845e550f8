// Export OpenAPI specification as JSON
//
// Usage: cargo run --bin export-openapi > docs/api/openapi.json
//
// This binary generates the OpenAPI spec without starting the API server.

use anyhow::Result;
use pupillix_control_plane::openapi::ApiDoc;

fn main() -> Result<()> {
    println!("{}", ApiDoc::to_json()?);
    Ok(())
}
