use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use mdprov::Keypair;

/// Write a new signing key: an Arweave RSA wallet, or Ed25519 when asked.
pub fn run(path: PathBuf, force: bool, ed25519: bool) -> Result<()> {
    let keypair = write_key(&path, force, ed25519)?;

    println!("Wrote {}", path.display());
    println!("Address: {}", keypair.owner().address());
    println!("\nexport MP_WALLET_PATH={}", path.display());
    Ok(())
}

fn write_key(path: &Path, force: bool, ed25519: bool) -> Result<Keypair> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let keypair = if ed25519 {
        Keypair::generate()
    } else {
        tracing::info!("generating 4096-bit RSA wallet");
        Keypair::generate_arweave().context("cannot generate wallet")?
    };
    let json = serde_json::to_string_pretty(&keypair.to_jwk())?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;

    tracing::debug!(
        path = %path.display(),
        key_type = ?keypair.signature_type(),
        address = %keypair.owner().address(),
        "signing key written"
    );
    Ok(keypair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use mdprov::core::SignatureType;
    use mdprov::Credential;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn written_key_loads_as_credential() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");

        let keypair = write_key(&path, false, true).unwrap();
        let credential = Credential::load(&path).unwrap();
        assert_eq!(credential.address(), keypair.owner().address());
        assert_eq!(keypair.signature_type(), SignatureType::Ed25519);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        std::fs::write(&path, "keep me").unwrap();

        assert!(write_key(&path, false, true).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

        write_key(&path, true, true).unwrap();
        assert!(Credential::load(&path).is_ok());
    }

    #[test]
    fn key_write_is_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let keypair = tracing::subscriber::with_default(subscriber, || {
            write_key(&path, false, true).unwrap()
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("signing key written"), "{logs}");
        assert!(logs.contains(&keypair.owner().address()), "{logs}");
    }
}
