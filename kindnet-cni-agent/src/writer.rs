use std::path::{Path, PathBuf};

use kindnet_cni_core::{cni::CniConfigBuilder, inputs::ConfigInputs};
use log::{debug, warn};

use crate::error::WriterError;

const TEMP_FILE_SUFFIX: &str = ".temp";

/// Writes the conflist, skipping the write when the inputs didn't change since the last one.
#[derive(Debug)]
pub struct CniConfigWriter {
    path: PathBuf,
    ipam_data_dir: Option<String>,
    last_inputs: Option<ConfigInputs>,
}

impl CniConfigWriter {
    pub fn new(path: PathBuf, ipam_data_dir: Option<String>) -> Self {
        Self {
            path,
            ipam_data_dir,
            last_inputs: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` when the file was (re)written.
    pub async fn write(&mut self, inputs: ConfigInputs) -> Result<bool, WriterError> {
        if self.last_inputs.as_ref() == Some(&inputs) {
            debug!("CNI configuration inputs are unchanged, skipping the write");
            return Ok(false);
        }

        let mut builder = CniConfigBuilder::default();
        if let Some(ipam_data_dir) = &self.ipam_data_dir {
            builder.ipam_data_dir(ipam_data_dir);
        }

        let rendered = builder
            .inputs(inputs.clone())
            .build()
            .map_err(WriterError::ConfigBuilderError)?
            .render()
            .map_err(WriterError::RenderError)?;

        self.write_atomically(rendered).await?;
        self.last_inputs = Some(inputs);

        Ok(true)
    }

    async fn write_atomically(&self, contents: String) -> Result<(), WriterError> {
        if let Some(directory) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(directory)
                .await
                .map_err(|err| WriterError::CreateDirectoryError(directory.to_owned(), err))?;
        }

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(TEMP_FILE_SUFFIX);
        let temp_path = PathBuf::from(temp_path);

        tokio::fs::write(&temp_path, contents)
            .await
            .map_err(|err| WriterError::WriteError(temp_path.clone(), err))?;
        if let Err(err) = tokio::fs::rename(&temp_path, &self.path).await {
            if let Err(cleanup_err) = tokio::fs::remove_file(&temp_path).await {
                warn!("Couldn't remove {temp_path:?}! {cleanup_err}");
            }

            return Err(WriterError::RenameError(self.path.clone(), err));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use kindnet_cni_core::inputs::ConfigInputs;

    use crate::error::WriterError;

    use super::CniConfigWriter;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kindnet-cni-agent-{}-{name}", std::process::id()))
            .join("net.d")
            .join("10-kindnet.conflist")
    }

    #[tokio::test]
    async fn writes_only_when_inputs_change() {
        let path = scratch_path("changes");
        let mut writer = CniConfigWriter::new(path.clone(), None);

        let first = ConfigInputs::compute(&["10.244.0.0/24"], Some(110), 0);
        let second = ConfigInputs::compute(&["10.244.0.0/24", "fd00::/64"], Some(110), 0);

        assert!(writer.write(first.clone()).await.unwrap());
        assert!(!writer.write(first).await.unwrap());
        assert!(writer.write(second).await.unwrap());

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("\"subnet\": \"fd00::/64\""));
        assert!(written.contains("\"rangeStart\": \"10.244.0.10\""));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap().parent().unwrap()).await;
    }

    #[tokio::test]
    async fn applies_ipam_data_dir_override() {
        let path = scratch_path("data-dir");
        let mut writer = CniConfigWriter::new(path.clone(), Some("/var/lib/cni/networks".to_owned()));

        writer
            .write(ConfigInputs::compute(&["10.244.0.0/24"], None, 1500))
            .await
            .unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("\"dataDir\": \"/var/lib/cni/networks\""));
        assert!(written.contains("\"mtu\": 1500"));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap().parent().unwrap()).await;
    }

    #[tokio::test]
    async fn removes_temp_file_when_rename_fails() {
        let path = scratch_path("rename");
        // a non-empty directory in place of the config can't be replaced by a file
        tokio::fs::create_dir_all(path.join("occupied")).await.unwrap();
        let mut writer = CniConfigWriter::new(path.clone(), None);

        let result = writer
            .write(ConfigInputs::compute(&["10.244.0.0/24"], None, 0))
            .await;

        assert!(matches!(result, Err(WriterError::RenameError(..))));

        let mut temp_path = path.clone().into_os_string();
        temp_path.push(".temp");
        assert!(tokio::fs::metadata(PathBuf::from(temp_path)).await.is_err());

        // a failed write isn't remembered, the next attempt tries again
        tokio::fs::remove_dir_all(&path).await.unwrap();
        assert!(writer
            .write(ConfigInputs::compute(&["10.244.0.0/24"], None, 0))
            .await
            .unwrap());

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap().parent().unwrap()).await;
    }
}
