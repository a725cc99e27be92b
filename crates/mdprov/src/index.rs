//! The provenance index: a markdown summary of every recorded upload,
//! republished on demand and reachable through a registered name.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use mdprov_core::{IndexVersion, LedgerRecord, TagSet, UploadResult};
use mdprov_store::{IndexHistory, StateDir};

use crate::config::ConfigError;
use crate::error::{ProvenanceError, Result};
use crate::pointer::{PointerOutcome, PointerPublisher};
use crate::service::{ProvenanceService, APP_NAME, CONTENT_TYPE_MARKDOWN};

/// Records listed in the index, newest first.
pub const MAX_INDEX_RECORDS: usize = 200;
/// `Type` tag of index documents.
pub const INDEX_TYPE: &str = "Agent-Brain";
const INDEX_DISPLAY_NAME: &str = "provenance-index.md";

/// Everything the index document is rendered from.
#[derive(Debug, Clone)]
pub struct IndexContext<'a> {
    pub arns_name: &'a str,
    pub wallet_address: &'a str,
    pub records: &'a [LedgerRecord],
    pub versions: &'a [IndexVersion],
    pub instructions: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Render the index document.
pub fn render_index(ctx: &IndexContext<'_>) -> String {
    ctx.to_string()
}

impl fmt::Display for IndexContext<'_> {
    fn fmt(&self, md: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.arns_name;
        let previous = self
            .versions
            .last()
            .map(|v| v.tx_id.to_string())
            .unwrap_or_else(|| "_none, this is the first version_".to_string());

        writeln!(md, "# Provenance Index: {name}\n")?;
        writeln!(
            md,
            "> A permanent, self-describing record of documents published by this identity.\n\
             > Fetch this file to discover everything below.\n"
        )?;

        writeln!(md, "## Identity\n")?;
        writeln!(md, "- **ArNS Name:** {name}")?;
        writeln!(md, "- **ArNS URL:** https://{name}.ar.io")?;
        writeln!(md, "- **Wallet Address:** {}", self.wallet_address)?;
        writeln!(
            md,
            "- **Last Updated:** {}",
            self.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )?;
        writeln!(md, "- **Previous Index:** {previous}\n")?;

        writeln!(md, "## Instructions\n")?;
        match self.instructions {
            Some(text) => writeln!(md, "{}\n", text.trim_end())?,
            None => writeln!(
                md,
                "_No instructions yet. Write them to `index-instructions.md` in the state directory._\n"
            )?,
        }

        writeln!(md, "## Usage\n")?;
        writeln!(md, "1. Set `MP_WALLET_PATH` to the signing key file")?;
        writeln!(md, "2. Set `MP_ARNS_NAME` to `{name}`")?;
        writeln!(md, "3. Upload a document: `mdprov upload <file>`")?;
        writeln!(md, "4. Republish this index: `mdprov index`\n")?;

        writeln!(md, "## Provenance Records\n")?;
        if self.records.is_empty() {
            writeln!(md, "_No uploads recorded yet._\n")?;
        } else {
            let total = self.records.len();
            if total > MAX_INDEX_RECORDS {
                writeln!(
                    md,
                    "_Showing the {MAX_INDEX_RECORDS} most recent of {total} records._\n"
                )?;
            }
            writeln!(md, "| Date | File | Size | Item | Content ID |")?;
            writeln!(md, "|------|------|------|------|------------|")?;
            for record in self.records.iter().rev().take(MAX_INDEX_RECORDS) {
                let cid = record.cid.to_string();
                writeln!(
                    md,
                    "| {} | {} | {} | [{}...]({}) | {}... |",
                    record.timestamp.format("%Y-%m-%d"),
                    escape_cell(&record.file),
                    record.size,
                    record.tx_id.short(),
                    record.gateway_url(),
                    &cid[..16],
                )?;
            }
            writeln!(md)?;
        }

        writeln!(md, "## Previous Versions\n")?;
        if self.versions.is_empty() {
            writeln!(md, "_This is the first version._\n")?;
        } else {
            writeln!(md, "| Date | Item | Records |")?;
            writeln!(md, "|------|------|---------|")?;
            for version in self.versions {
                writeln!(
                    md,
                    "| {} | [{}...]({}) | {} |",
                    version.timestamp.format("%Y-%m-%d"),
                    version.tx_id.short(),
                    version.arweave_url,
                    version.transaction_count,
                )?;
            }
            writeln!(md)?;
        }

        Ok(())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Result of an index sync.
#[derive(Debug, Clone)]
pub struct IndexOutcome {
    pub upload: UploadResult,
    pub version: IndexVersion,
    pub pointer: PointerOutcome,
}

/// Renders, uploads, logs and points at the index document.
pub struct IndexSync {
    service: Arc<ProvenanceService>,
    history: Arc<dyn IndexHistory>,
    publisher: PointerPublisher,
    state: StateDir,
    arns_name: Option<String>,
}

impl IndexSync {
    pub fn new(
        service: Arc<ProvenanceService>,
        history: Arc<dyn IndexHistory>,
        publisher: PointerPublisher,
        state: StateDir,
        arns_name: Option<String>,
    ) -> Self {
        Self {
            service,
            history,
            publisher,
            state,
            arns_name,
        }
    }

    /// Publish a fresh index and point the registered name at it.
    ///
    /// A pointer failure is reported in the outcome, not as an error.
    pub async fn sync(&self) -> Result<IndexOutcome> {
        let name = self
            .arns_name
            .as_deref()
            .ok_or(ConfigError::MissingArnsName)?;

        let records = self.service.ledger().records().await?;
        let versions = self.history.versions().await?;
        let instructions = self.state.instructions().await;
        let wallet_address = self.publisher.credential().address();

        let document = render_index(&IndexContext {
            arns_name: name,
            wallet_address: &wallet_address,
            records: &records,
            versions: &versions,
            instructions: instructions.as_deref(),
            updated_at: Utc::now(),
        });
        tracing::info!(
            name,
            records = records.len(),
            versions = versions.len(),
            size = document.len(),
            "index rendered"
        );

        let tags = TagSet::new()
            .with("Content-Type", CONTENT_TYPE_MARKDOWN)
            .with("App-Name", APP_NAME)
            .with("App-Version", self.service.config().app_version.clone())
            .with("Type", INDEX_TYPE)
            .with("ArNS-Name", name);
        let upload = self
            .service
            .submit_unchecked(document.as_bytes(), INDEX_DISPLAY_NAME, tags)
            .await?;

        let version = IndexVersion::from_result(&upload, records.len(), Utc::now());
        if let Err(e) = self.history.append(&version).await {
            tracing::error!(item_id = %upload.item_id, error = %e, "index uploaded but version log write failed");
            return Err(ProvenanceError::IndexLog {
                item_id: upload.item_id,
                source: e,
            });
        }

        let pointer = self
            .publisher
            .publish_best_effort(name, &upload.item_id)
            .await;
        Ok(IndexOutcome {
            upload,
            version,
            pointer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mdprov_core::{ContentId, ItemId, Origin};
    use std::collections::BTreeMap;

    fn record(i: usize) -> LedgerRecord {
        let content = format!("doc {i}");
        let result = UploadResult::new(
            ItemId::new(format!("item{i:04}abcdefghijklmnop")),
            ContentId::identify(content.as_bytes()),
            content.len() as u64,
            Origin::New,
        );
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        LedgerRecord::from_result(&result, format!("doc{i}.md"), BTreeMap::new(), timestamp)
    }

    fn context<'a>(records: &'a [LedgerRecord], versions: &'a [IndexVersion]) -> IndexContext<'a> {
        IndexContext {
            arns_name: "alice",
            wallet_address: "wallet-addr",
            records,
            versions,
            instructions: None,
            updated_at: Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap(),
        }
    }

    #[test]
    fn renders_empty_index() {
        let md = render_index(&context(&[], &[]));
        assert!(md.starts_with("# Provenance Index: alice\n"));
        assert!(md.contains("- **ArNS URL:** https://alice.ar.io"));
        assert!(md.contains("- **Wallet Address:** wallet-addr"));
        assert!(md.contains("- **Last Updated:** 2025-02-03T04:05:06.000Z"));
        assert!(md.contains("_No uploads recorded yet._"));
        assert!(md.contains("_This is the first version._"));
        assert!(md.contains("index-instructions.md"));
    }

    #[test]
    fn lists_newest_first_and_truncates() {
        let records: Vec<_> = (0..MAX_INDEX_RECORDS + 5).map(record).collect();
        let md = render_index(&context(&records, &[]));

        assert!(md.contains("_Showing the 200 most recent of 205 records._"));
        let rows: Vec<_> = md.lines().filter(|l| l.contains("[item")).collect();
        assert_eq!(rows.len(), MAX_INDEX_RECORDS);
        assert!(rows[0].contains("| doc204.md |"));
        assert!(!md.contains("| doc4.md |"));
    }

    #[test]
    fn includes_instructions_and_versions() {
        let result = UploadResult::new(
            ItemId::new("previous-index-item"),
            ContentId::identify(b"old"),
            3,
            Origin::New,
        );
        let versions = vec![IndexVersion::from_result(&result, 7, Utc::now())];
        let mut ctx = context(&[], &versions);
        ctx.instructions = Some("Cite the newest record first.\n\n");

        let md = render_index(&ctx);
        assert!(md.contains("## Instructions\n\nCite the newest record first.\n\n"));
        assert!(md.contains("- **Previous Index:** previous-index-item"));
        assert!(md.contains("| 7 |"));
    }

    /// Accepts `budget` bytes, then fails.
    struct Limited {
        out: String,
        budget: usize,
    }

    impl fmt::Write for Limited {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if s.len() > self.budget {
                return Err(fmt::Error);
            }
            self.budget -= s.len();
            self.out.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn write_errors_propagate() {
        use std::fmt::Write as _;

        let records: Vec<_> = (0..3).map(record).collect();
        let ctx = context(&records, &[]);
        let full = render_index(&ctx);

        let mut short = Limited {
            out: String::new(),
            budget: full.len() / 2,
        };
        assert!(write!(short, "{ctx}").is_err());
        assert!(full.starts_with(&short.out));

        let mut roomy = Limited {
            out: String::new(),
            budget: full.len(),
        };
        write!(roomy, "{ctx}").unwrap();
        assert_eq!(roomy.out, full);
    }

    #[test]
    fn escapes_table_cells() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }
}
