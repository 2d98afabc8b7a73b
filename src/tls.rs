// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustls::{ClientConfig, RootCertStore};
use tracing::{trace, warn};

use crate::error::ClientError;

static CONFIG: OnceCell<ClientConfig> = OnceCell::new();

/// Shared rustls configuration using the ring provider and the platform's native roots.
pub(crate) fn config() -> Result<&'static ClientConfig, ClientError> {
    CONFIG.get_or_try_init(build_config)
}

fn build_config() -> Result<ClientConfig, ClientError> {
    let mut roots = RootCertStore::empty();

    let native = rustls_native_certs::load_native_certs();
    for error in &native.errors {
        warn!("Failed to load a native certificate: {error}");
    }

    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    trace!("Loaded {} native root certificates, ignored {}", added, ignored);

    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(config)
}
