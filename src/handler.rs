//! One pack request from start to delivery.
//!
//! Acknowledges the request, runs the pipeline and delivers either the
//! archive or a failure notice tagged with a correlation id that also
//! appears in the error log.

use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::delivery::{failure_message, Delivery, DONE_MESSAGE, GENERATING_MESSAGE};
use crate::error::PackError;
use crate::pipeline::Pipeline;
use crate::source::GuildSource;

/// How a request ended.
#[derive(Debug)]
pub enum RequestOutcome {
    Delivered { file_name: String, bytes: usize },
    Failed { error_id: Uuid, error: PackError },
}

impl RequestOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RequestOutcome::Delivered { .. })
    }
}

/// Build and deliver the pack for `guild_id`.
pub async fn handle_request(
    pipeline: &Pipeline,
    source: &dyn GuildSource,
    delivery: &dyn Delivery,
    guild_id: &str,
) -> RequestOutcome {
    let span = info_span!("request", guild_id);

    async {
        let result = async {
            delivery.send_message(GENERATING_MESSAGE).await?;
            let output = pipeline.run(source, guild_id).await?;
            let bytes = output.bytes.len();
            delivery
                .send_file(DONE_MESSAGE, &output.file_name, output.bytes)
                .await?;
            Ok::<_, PackError>((output.file_name, bytes))
        }
        .await;

        match result {
            Ok((file_name, bytes)) => RequestOutcome::Delivered { file_name, bytes },
            Err(e) => {
                let error_id = Uuid::new_v4();
                error!(%error_id, step = e.step(), error = %e, "request failed");

                let notice = failure_message(Some(&error_id.to_string()));
                if let Err(send_err) = delivery.send_message(&notice).await {
                    error!(%error_id, error = %send_err, "unable to send failure notice");
                }

                RequestOutcome::Failed { error_id, error: e }
            }
        }
    }
    .instrument(span)
    .await
}
