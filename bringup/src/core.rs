//! Pipeline facade shared by the CLI and library users.
//!
//! Loading turns any supported input into a `ParsedEntities`; planning turns
//! entities into an annotated `TestPlan`.

use std::path::{Path, PathBuf};

use crate::ai::{generate_plan_llm, LlmConfig};
use crate::context::{ContextStore, StoreError};
use crate::infer::HeuristicInferencer;
use crate::ingest::{self, display_extension, IngestError, InputKind};
use crate::model::{ParsedEntities, SchemaError, TestPlan};
use crate::parser::{NetlistError, NetlistParser};
use crate::plan::generate_plan_offline;
use crate::rules::EntityValidator;

#[derive(Debug, thiserror::Error)]
pub enum BringupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("Invalid entity JSON: {0}")]
    Schema(#[from] SchemaError),
    #[error("Extraction failed: {0}")]
    Extract(String),
    #[error("Context library error: {0}")]
    Store(#[from] StoreError),
}

impl From<NetlistError> for BringupError {
    fn from(e: NetlistError) -> Self {
        match e {
            NetlistError::NotFound(path) => BringupError::NotFound(path),
            NetlistError::Io(err) => BringupError::Io(err),
        }
    }
}

impl From<IngestError> for BringupError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Io(err) => BringupError::Io(err),
            other => BringupError::Extract(other.to_string()),
        }
    }
}

/// How an input path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Dispatch on extension across every supported kind
    Auto,
    /// Always IPC-D-356A
    Netlist,
    /// Netlist extensions as netlists, anything else as entity JSON
    #[default]
    Entities,
}

impl LoadMode {
    pub fn from_flags(auto: bool, netlist: bool) -> Self {
        if auto {
            LoadMode::Auto
        } else if netlist {
            LoadMode::Netlist
        } else {
            LoadMode::Entities
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Skip the LLM stage entirely
    pub offline: bool,
}

pub struct BringupCore;

impl BringupCore {
    pub fn load_entities(path: &Path, mode: LoadMode) -> Result<ParsedEntities, BringupError> {
        if !path.exists() {
            return Err(BringupError::NotFound(path.to_path_buf()));
        }

        match mode {
            LoadMode::Netlist => Ok(NetlistParser::parse_file(path)?),
            LoadMode::Entities => {
                if InputKind::from_path(path) == Some(InputKind::Netlist) {
                    Ok(NetlistParser::parse_file(path)?)
                } else {
                    load_json(path)
                }
            }
            LoadMode::Auto => {
                let kind = InputKind::from_path(path)
                    .ok_or_else(|| BringupError::UnsupportedFileType(display_extension(path)))?;
                tracing::info!("Detected {} input: {}", kind.as_str(), path.display());
                load_kind(path, kind)
            }
        }
    }

    /// Plan, then append validation findings to the notes.
    pub async fn build_plan(
        entities: &ParsedEntities,
        options: PlanOptions,
        config: &LlmConfig,
        store: Option<&dyn ContextStore>,
    ) -> TestPlan {
        let plan = if options.offline {
            generate_plan_offline(entities)
        } else {
            generate_plan_llm(entities, config, store).await
        };
        let issues = EntityValidator::validate(entities);
        EntityValidator::annotate(plan, &issues)
    }

    /// Plain text of any supported input, for adding it to a context library.
    pub fn extract_text(path: &Path) -> Result<String, BringupError> {
        if !path.exists() {
            return Err(BringupError::NotFound(path.to_path_buf()));
        }
        let kind = InputKind::from_path(path)
            .ok_or_else(|| BringupError::UnsupportedFileType(display_extension(path)))?;
        match kind {
            InputKind::Archive => {
                let dir = tempfile::tempdir()?;
                let members = ingest::extract_zip(path, dir.path())?;
                let texts = members
                    .iter()
                    .filter(|m| m.is_file())
                    .filter_map(|m| InputKind::from_path(m).map(|k| (m, k)))
                    .filter(|(_, k)| *k != InputKind::Archive)
                    .map(|(m, k)| ingest::extract_text(m, k))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(texts.join("\n"))
            }
            other => Ok(ingest::extract_text(path, other)?),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_json(path: &Path) -> Result<ParsedEntities, BringupError> {
    let text = std::fs::read_to_string(path)?;
    Ok(ParsedEntities::from_json_str(&text)?)
}

fn load_kind(path: &Path, kind: InputKind) -> Result<ParsedEntities, BringupError> {
    match kind {
        InputKind::Json => load_json(path),
        InputKind::Netlist => Ok(NetlistParser::parse_file(path)?),
        InputKind::Bom | InputKind::Altium | InputKind::Pdf => {
            let text = ingest::extract_text(path, kind)?;
            Ok(HeuristicInferencer::infer(&text, &file_name(path)))
        }
        InputKind::Archive => load_archive(path),
    }
}

fn load_archive(path: &Path) -> Result<ParsedEntities, BringupError> {
    let dir = tempfile::tempdir()?;
    let members: Vec<(PathBuf, InputKind)> = ingest::extract_zip(path, dir.path())?
        .into_iter()
        .filter(|m| m.is_file())
        .filter_map(|m| InputKind::from_path(&m).map(|k| (m, k)))
        .collect();

    if let Some((member, kind)) = members
        .iter()
        .find(|(_, k)| matches!(k, InputKind::Json | InputKind::Netlist))
    {
        tracing::info!("Using {} from archive: {}", kind.as_str(), member.display());
        return load_kind(member, *kind);
    }

    let mut blob = Vec::new();
    for (member, kind) in members.iter().filter(|(_, k)| k.is_heuristic()) {
        tracing::debug!("Reading archive member {}", member.display());
        blob.push(ingest::extract_text(member, *kind)?);
    }
    if blob.is_empty() {
        tracing::warn!("No supported members in {}", path.display());
    }
    Ok(HeuristicInferencer::infer(&blob.join("\n"), &file_name(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const NETLIST: &str = "C  Project Name : Demo Board\n327 +3V3 U1 X100Y200\n327 GND U1\n";

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn write_zip(dir: &TempDir, name: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = dir.path().join(name);
        let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
        for (member, body) in members {
            zip.start_file(*member, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let err = BringupCore::load_entities(Path::new("/nope/board.json"), LoadMode::Auto).unwrap_err();
        assert!(matches!(err, BringupError::NotFound(_)));
        assert_eq!(err.to_string(), "File /nope/board.json does not exist");
    }

    #[test]
    fn test_unsupported_extension_in_auto_mode() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.docx", "x");
        let err = BringupCore::load_entities(&path, LoadMode::Auto).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: .docx");
    }

    #[test]
    fn test_entities_mode_routes_netlist_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "board.ipc", NETLIST);
        let entities = BringupCore::load_entities(&path, LoadMode::Entities).unwrap();
        assert_eq!(entities.title, "Demo Board");
    }

    #[test]
    fn test_entities_mode_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "board.json", r#"{"title": 5}"#);
        let err = BringupCore::load_entities(&path, LoadMode::Entities).unwrap_err();
        assert!(matches!(err, BringupError::Schema(_)));
    }

    #[test]
    fn test_auto_bom_uses_file_name_as_title() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bom.csv", "U1,SX1276\nY1,16MHz\n");
        let entities = BringupCore::load_entities(&path, LoadMode::Auto).unwrap();
        assert_eq!(entities.title, "bom.csv");
        assert!(entities.functional_tests.iter().any(|t| t.command.as_deref() == Some("bit.lora")));
        assert_eq!(entities.oscillators[0].reference, "Y1");
    }

    #[test]
    fn test_archive_prefers_json_member() {
        let dir = TempDir::new().unwrap();
        let zip = write_zip(
            &dir,
            "bundle.zip",
            &[
                ("bom.csv", "U1,SX1276\n"),
                ("entities.json", r#"{"title":"From JSON","rails":[{"name":"+5V","voltage":5.0}]}"#),
            ],
        );
        let entities = BringupCore::load_entities(&zip, LoadMode::Auto).unwrap();
        assert_eq!(entities.title, "From JSON");
    }

    #[test]
    fn test_archive_infers_from_concatenated_members() {
        let dir = TempDir::new().unwrap();
        let zip = write_zip(
            &dir,
            "bundle.zip",
            &[("bom.csv", "U1,SX1276\n"), ("imu.csv", "U2,LSM6DSOX\n")],
        );
        let entities = BringupCore::load_entities(&zip, LoadMode::Auto).unwrap();
        assert_eq!(entities.title, "bundle.zip");
        let commands: Vec<_> = entities
            .functional_tests
            .iter()
            .filter_map(|t| t.command.as_deref())
            .collect();
        assert!(commands.contains(&"bit.lora"));
        assert!(commands.contains(&"bit.imu"));
    }

    #[tokio::test]
    async fn test_build_plan_annotates_issues() {
        let entities = ParsedEntities::new("Bare");
        let plan = BringupCore::build_plan(
            &entities,
            PlanOptions { offline: true },
            &LlmConfig::default(),
            None,
        )
        .await;
        let notes = plan.notes.unwrap();
        assert!(notes.contains("Validation Notes:\n- No rails found; add at least one power rail."));
    }

    #[tokio::test]
    async fn test_build_plan_without_key_matches_offline() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "board.net", NETLIST);
        let entities = BringupCore::load_entities(&path, LoadMode::Netlist).unwrap();
        let online = BringupCore::build_plan(&entities, PlanOptions::default(), &LlmConfig::default(), None).await;
        let offline = BringupCore::build_plan(&entities, PlanOptions { offline: true }, &LlmConfig::default(), None).await;
        assert_eq!(online, offline);
    }

    #[test]
    fn test_extract_text_for_library() {
        let dir = TempDir::new().unwrap();
        let zip = write_zip(&dir, "docs.zip", &[("a.csv", "U1,SX1276\n"), ("b.txt", "327 GND U1\n")]);
        let text = BringupCore::extract_text(&zip).unwrap();
        assert!(text.contains("U1 SX1276"));
        assert!(text.contains("327 GND U1"));
    }
}
