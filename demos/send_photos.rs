//! Submits two pictures by URL and prints the certification ID.
//!
//! ```sh
//! SEGVIEW_API_URL=https://api.segview.example \
//! SEGVIEW_CLIENT_ID=... SEGVIEW_CLIENT_SECRET=... \
//! cargo run --example send_photos
//! ```

use segview_client::observability::{init_logging, LogFormat};
use segview_client::{CallbackExt, Picture, SegViewClient};

const SAMPLE_LINK: &str =
    "https://www.carsdrive.com.ar/wp-content/uploads/2015/07/FullSizeRenderfgf_resize.jpg";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Pretty)?;

    let client = SegViewClient::from_env()?;
    client.sandbox_mode(Some(true));

    let pictures = vec![
        Picture::new("picture_0", SAMPLE_LINK),
        Picture::new("picture_1", SAMPLE_LINK),
    ];

    client
        .send_photos(&pictures)
        .with_callback(|result, error| {
            if let Some(error) = error {
                tracing::error!(%error, "Recognition failed");
            }
            if let Some(certification_id) = result.and_then(|r| r.certification_id()) {
                println!("Getting back the certification {}", certification_id);
            }
        })
        .await?;

    Ok(())
}
