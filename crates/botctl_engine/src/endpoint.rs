use url::Url;

use crate::{ControlError, FailureKind};

/// Base address of the remote control endpoint, injected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    status_url: Url,
    control_url: Url,
}

impl Endpoint {
    /// Accepts an absolute `http`/`https` address. Paths are appended to it
    /// verbatim, so `http://host:8080/api` yields `http://host:8080/api/bot/status`.
    pub fn parse(raw: &str) -> Result<Self, ControlError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|err| {
            ControlError::new(FailureKind::InvalidEndpoint, format!("{trimmed}: {err}"))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ControlError::new(
                FailureKind::InvalidEndpoint,
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(ControlError::new(
                FailureKind::InvalidEndpoint,
                "endpoint must not carry a query or fragment",
            ));
        }

        let join = |suffix: &str| {
            let base = base.as_str().trim_end_matches('/');
            Url::parse(&format!("{base}/{suffix}"))
                .map_err(|err| ControlError::new(FailureKind::InvalidEndpoint, err.to_string()))
        };

        Ok(Self {
            status_url: join("bot/status")?,
            control_url: join("bot/control")?,
        })
    }

    pub fn status_url(&self) -> &Url {
        &self.status_url
    }

    pub fn control_url(&self) -> &Url {
        &self.control_url
    }
}

#[cfg(test)]
mod tests {
    use super::Endpoint;
    use crate::FailureKind;

    #[test]
    fn appends_paths_to_host_base() {
        let endpoint = Endpoint::parse("http://10.0.0.5:8080").unwrap();
        assert_eq!(endpoint.status_url().as_str(), "http://10.0.0.5:8080/bot/status");
        assert_eq!(endpoint.control_url().as_str(), "http://10.0.0.5:8080/bot/control");
    }

    #[test]
    fn keeps_base_path_and_ignores_trailing_slash() {
        let endpoint = Endpoint::parse(" https://example.com/api/ ").unwrap();
        assert_eq!(endpoint.status_url().as_str(), "https://example.com/api/bot/status");
    }

    #[test]
    fn rejects_unsupported_input() {
        for raw in ["", "not a url", "ftp://example.com", "http://example.com/?x=1"] {
            let err = Endpoint::parse(raw).unwrap_err();
            assert_eq!(err.kind, FailureKind::InvalidEndpoint, "input {raw:?}");
        }
    }
}
