//! Minutes synthesis.
//!
//! Full mode fans the whole transcript out to three generation calls —
//! abstract summary, key points, action items — that run concurrently and
//! join deterministically by stage. The group is all-or-nothing: one failed
//! stage discards the others' results.

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::generation::GenerationClient;

const ABSTRACT_SUMMARY_INSTRUCTION: &str = "You are a highly skilled AI trained in language \
    comprehension and summarization. Based on the following text, summarize it into a concise \
    abstract paragraph. Retain the most important points, providing a coherent and readable \
    summary that could help a person understand the main points of the discussion without \
    needing to read the entire text. Avoid unnecessary details or tangential points.";

const KEY_POINTS_INSTRUCTION: &str = "You are a highly skilled AI specialized in distilling \
    information into key points. Based on the following text, identify and list the main points \
    that were discussed or raised. These should be the most important ideas, findings, or topics \
    crucial to the essence of the discussion. Your goal is to provide a list that someone could \
    read to quickly understand what was talked about.";

const ACTION_ITEMS_INSTRUCTION: &str = "You are a highly skilled AI specialized in analyzing \
    conversations and extracting action items. Based on the following text, identify any tasks, \
    assignments, or actions that were agreed upon or mentioned as needing to be done. These could \
    be tasks assigned to specific individuals or general actions the group decided to take. \
    Provide a clear and concise list of these actions.";

/// What the pipeline produces: transcript only, or transcript plus the three
/// extracted sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProcessingMode {
    Transcription,
    Full,
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingMode::Transcription => f.write_str("transcription"),
            ProcessingMode::Full => f.write_str("full"),
        }
    }
}

impl FromStr for ProcessingMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("transcription") {
            Ok(ProcessingMode::Transcription)
        } else if s.eq_ignore_ascii_case("full") {
            Ok(ProcessingMode::Full)
        } else {
            Err(PipelineError::InvalidMode(s.to_string()))
        }
    }
}

/// The three Full-mode extraction stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    AbstractSummary,
    KeyPoints,
    ActionItems,
}

impl GenerationStage {
    pub fn key(&self) -> &'static str {
        match self {
            GenerationStage::AbstractSummary => "abstract_summary",
            GenerationStage::KeyPoints => "key_points",
            GenerationStage::ActionItems => "action_items",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            GenerationStage::AbstractSummary => ABSTRACT_SUMMARY_INSTRUCTION,
            GenerationStage::KeyPoints => KEY_POINTS_INSTRUCTION,
            GenerationStage::ActionItems => ACTION_ITEMS_INSTRUCTION,
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sections extracted in Full mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinutesSynthesis {
    pub abstract_summary: String,
    pub key_points: String,
    pub action_items: String,
}

/// The structured result the document is rendered from. Section order is
/// fixed by [`MinutesRecord::sections`], not by any runtime map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinutesRecord {
    pub complete_transcription: String,
    pub synthesis: Option<MinutesSynthesis>,
}

impl MinutesRecord {
    pub fn transcription_only(complete_transcription: String) -> Self {
        Self {
            complete_transcription,
            synthesis: None,
        }
    }

    pub fn full(complete_transcription: String, synthesis: MinutesSynthesis) -> Self {
        Self {
            complete_transcription,
            synthesis: Some(synthesis),
        }
    }

    /// `(key, text)` pairs in document order.
    pub fn sections(&self) -> Vec<(&'static str, &str)> {
        let mut sections: Vec<(&'static str, &str)> =
            vec![("complete_transcription", &self.complete_transcription)];

        if let Some(synthesis) = &self.synthesis {
            sections.push((
                GenerationStage::AbstractSummary.key(),
                &synthesis.abstract_summary,
            ));
            sections.push((GenerationStage::KeyPoints.key(), &synthesis.key_points));
            sections.push((GenerationStage::ActionItems.key(), &synthesis.action_items));
        }

        sections
    }
}

pub struct Synthesizer {
    client: Arc<dyn GenerationClient>,
}

impl Synthesizer {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Build the minutes record for a transcript according to the mode.
    pub async fn synthesize(
        &self,
        transcript: &str,
        mode: ProcessingMode,
        cancel: &CancellationToken,
    ) -> PipelineResult<MinutesRecord> {
        match mode {
            ProcessingMode::Transcription => {
                Ok(MinutesRecord::transcription_only(transcript.to_string()))
            }
            ProcessingMode::Full => {
                if cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }

                info!(
                    "Synthesizing minutes with {} ({} chars of transcript)",
                    self.client.name(),
                    transcript.len()
                );

                let (abstract_summary, key_points, action_items) = tokio::try_join!(
                    self.call(GenerationStage::AbstractSummary, transcript),
                    self.call(GenerationStage::KeyPoints, transcript),
                    self.call(GenerationStage::ActionItems, transcript),
                )?;

                Ok(MinutesRecord::full(
                    transcript.to_string(),
                    MinutesSynthesis {
                        abstract_summary,
                        key_points,
                        action_items,
                    },
                ))
            }
        }
    }

    async fn call(&self, stage: GenerationStage, transcript: &str) -> PipelineResult<String> {
        self.client
            .generate(stage.instruction(), transcript)
            .await
            .map_err(|source| PipelineError::Generation { stage, source })
    }
}
