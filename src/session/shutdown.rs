use tokio::select;
use tokio_util::sync::CancellationToken;

/// Turns Ctrl-C into session cancellation. Also resolves when something else
/// cancels the token first, so a quit command doesn't leave this task
/// waiting forever.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
