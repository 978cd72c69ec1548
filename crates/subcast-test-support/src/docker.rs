//! Environment probes for integration suites that need a live Redis/RabbitMQ
//! container.

use std::path::Path;
use std::process::Command;

/// Returns `true` if a Docker daemon is reachable for integration tests.
///
/// Integration suites for `subcast-store`'s Redis backend and
/// `subcast-broker`'s AMQP backend call this to skip gracefully when no
/// container runtime is available, rather than failing the whole suite.
#[must_use]
pub fn available() -> bool {
    available_with_host(std::env::var("DOCKER_HOST").ok())
}

fn available_with_host(host: Option<String>) -> bool {
    if let Some(host) = host {
        if let Some(path) = host.strip_prefix("unix://") {
            return Path::new(path).exists();
        }
        return true;
    }

    Path::new("/var/run/docker.sock").exists()
        || Command::new("docker")
            .args(["info"])
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_socket_override_requires_the_path_to_exist() {
        assert!(!available_with_host(Some(
            "unix:///definitely/missing.sock".into()
        )));
    }

    #[test]
    fn tcp_override_is_trusted_without_a_probe() {
        assert!(available_with_host(Some("tcp://127.0.0.1:2375".into())));
    }
}
