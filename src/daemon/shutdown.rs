use tokio::select;
use tokio_util::sync::CancellationToken;

/// Detects signals sent to the process. Also returns when the token gets cancelled from inside
/// the application, for example after the host closes its input.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {},
    };
}
