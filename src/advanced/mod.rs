// Async alternative to the threaded acquirer (tokio + CancellationToken).

pub mod async_acquirer;
