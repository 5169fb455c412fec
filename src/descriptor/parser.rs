use crate::descriptor::model::{Meta, PageDescriptor};
use crate::descriptor::validate::validate_descriptor;
use crate::foundation::core::now;
use crate::foundation::error::{EntityKind, PagesmithError, PagesmithResult};
use crate::foundation::validation::ValidationReport;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Loads, validates, and writes YAML page descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorParser;

impl DescriptorParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and deserialize a descriptor file. Does not validate.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn parse(&self, path: impl AsRef<Path>) -> PagesmithResult<PageDescriptor> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PagesmithError::not_found(EntityKind::Descriptor, path.display().to_string())
            } else {
                PagesmithError::parse(format!("read descriptor '{}': {e}", path.display()))
            }
        })?;
        self.parse_str(&text)
            .map_err(|e| PagesmithError::parse(format!("'{}': {e}", path.display())))
    }

    /// Deserialize a descriptor from YAML text.
    pub fn parse_str(&self, text: &str) -> PagesmithResult<PageDescriptor> {
        serde_yaml::from_str(text)
            .map_err(|e| PagesmithError::parse(format!("malformed descriptor YAML: {e}")))
    }

    /// Collect every schema violation of `desc`.
    pub fn validate(&self, desc: &PageDescriptor) -> ValidationReport {
        validate_descriptor(desc)
    }

    /// Parse and validate in one step.
    pub async fn load(&self, path: impl AsRef<Path>) -> PagesmithResult<PageDescriptor> {
        let desc = self.parse(path).await?;
        self.validate(&desc).into_result()?;
        Ok(desc)
    }

    /// Serialize `desc` back to YAML at `path`.
    ///
    /// `meta.lastModified` is stamped first. The document goes to a sibling temporary file which
    /// is then renamed over `path`, so readers never observe a half-written descriptor.
    #[tracing::instrument(skip(self, path, desc), fields(path = %path.as_ref().display()))]
    pub async fn write(
        &self,
        path: impl AsRef<Path>,
        desc: &mut PageDescriptor,
    ) -> PagesmithResult<()> {
        let path = path.as_ref();
        desc.meta.get_or_insert_with(Meta::default).last_modified = Some(now());

        let text = serde_yaml::to_string(desc)
            .map_err(|e| PagesmithError::parse(format!("serialize descriptor: {e}")))?;

        let tmp = temp_sibling(path);
        if let Err(e) = tokio::fs::write(&tmp, text.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(anyhow::Error::new(e)
                .context(format!("write descriptor '{}'", tmp.display()))
                .into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(anyhow::Error::new(e)
                .context(format!("replace descriptor '{}'", path.display()))
                .into());
        }
        tracing::debug!("descriptor written");
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "descriptor.yaml".to_string());
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.tmp-{}-{seq}", std::process::id()))
}

#[cfg(test)]
#[path = "../../tests/unit/descriptor/parser.rs"]
mod tests;
