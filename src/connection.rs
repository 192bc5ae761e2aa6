//! IMAP connection and TLS helpers
//!
//! Opens the TCP connection, secures it (implicit TLS or STARTTLS),
//! and logs in. The result is either a connected [`Session`] or an
//! [`Error::Connection`]; nothing half-initialized escapes.

use crate::config::{ImapConfig, Security};
use crate::error::{Error, Result};
use crate::session::Session;
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info};

/// A TLS-wrapped IMAP session.
pub type ImapSession = async_imap::Session<Compat<tokio_rustls::client::TlsStream<TcpStream>>>;

type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Open an authenticated session.
///
/// Connects to `config.host:config.port`, secures the stream as
/// `config.security` says, and logs in with `config.credentials`.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the TCP connection, the TLS
/// handshake, or the login fails.
pub async fn connect(config: &ImapConfig) -> Result<Session> {
    let addr = format!("{}:{}", config.host, config.port);
    debug!("Connecting to IMAP server at {} ({:?})", addr, config.security);

    let tcp_stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| Error::Connection(format!("Cannot reach {addr}: {e}")))?;

    let connector = tls_connector(config.accept_invalid_certs)?;
    let tls_stream = match config.security {
        Security::Tls => handshake(&connector, &config.host, tcp_stream).await?,
        Security::StartTls => {
            let mut client = async_imap::Client::new(tcp_stream.compat());
            client
                .run_command_and_check_ok("STARTTLS", None)
                .await
                .map_err(|e| Error::Connection(format!("STARTTLS failed: {e}")))?;
            let inner = client.into_inner().into_inner();
            handshake(&connector, &config.host, inner).await?
        }
    };

    let client = async_imap::Client::new(tls_stream.compat());
    let session = client
        .login(&config.credentials.username, &config.credentials.password)
        .await
        .map_err(|(e, _)| {
            Error::Connection(format!(
                "Login failed for {}: {e}",
                config.credentials.username
            ))
        })?;

    info!(
        "Connected to {} as {}",
        addr, config.credentials.username
    );
    Ok(Session::new(session, config.credentials.username.clone()))
}

async fn handshake(connector: &TlsConnector, host: &str, stream: TcpStream) -> Result<TlsStream> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| Error::Connection(format!("Invalid server name {host}: {e}")))?;

    connector
        .connect(server_name, stream)
        .await
        .map_err(|e| Error::Connection(format!("TLS handshake with {host} failed: {e}")))
}

/// Build a TLS connector backed by the ring provider.
///
/// Certificates are checked against the webpki roots unless
/// `accept_invalid_certs` is set, in which case every certificate is
/// accepted.
fn tls_connector(accept_invalid_certs: bool) -> Result<TlsConnector> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Connection(format!("TLS setup failed: {e}")))?;

    let config = if accept_invalid_certs {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
            .with_no_client_auth()
    } else {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots).with_no_client_auth()
    };

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Certificate verifier that accepts all certificates
/// (for self-signed local bridges and test servers).
#[derive(Debug)]
struct DangerousVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
