/*! # Roomsync Tests

Integration tests running several [`NetworkClient`](roomsync::client::NetworkClient)s
connected to the same in-process relay, driven frame by frame by a simulated clock.
*/

#[cfg(test)]
mod client_server;
pub mod stepper;
