//! The segment registry: the ordered list of segments a run renders.
//!
//! Registry order is processing order. The registry is never re-sorted by
//! ordinal; [`SegmentRegistry::ordinal_issues`] only reports ordering and
//! numbering problems so callers can warn about them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::segment::SegmentDescriptor;

/// (ordinal, title, asset stem, target seconds, narration)
const BUILTIN_SEGMENTS: &[(u32, &str, &str, f64, &str)] = &[
    (
        1,
        "Intro",
        "01_intro",
        12.0,
        "Welcome. In the next few minutes we'll walk through the product end to end.",
    ),
    (
        2,
        "Dashboard Overview",
        "02_dashboard",
        18.0,
        "The dashboard gives you every active project at a glance.",
    ),
    (
        3,
        "Creating a Project",
        "03_create_project",
        20.0,
        "Creating a project takes a name and a template. Everything else is optional.",
    ),
    (
        4,
        "AI-Powered Search",
        "04_search",
        22.0,
        "Search understands questions, not just keywords.",
    ),
    (
        5,
        "Team Collaboration",
        "05_collaboration",
        18.0,
        "Invite teammates, leave comments, and follow changes as they happen.",
    ),
    (
        6,
        "Reports & Export",
        "06_reports",
        16.0,
        "Reports export to PDF or CSV with a single click.",
    ),
    (
        7,
        "Wrap Up",
        "07_wrap_up",
        10.0,
        "That's the tour. Thanks for watching.",
    ),
];

/// Ordered collection of segment descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRegistry {
    segments: Vec<SegmentDescriptor>,
}

/// A numbering or ordering problem found in a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdinalIssue {
    /// Ordinals start at 1.
    Zero { index: usize },
    /// The same ordinal appears at several registry positions.
    Duplicate { ordinal: u32, indices: Vec<usize> },
    /// An ordinal between 1 and the maximum is never used.
    Gap { missing: u32 },
    /// This entry's ordinal is lower than its predecessor's.
    OutOfOrder {
        index: usize,
        ordinal: u32,
        previous: u32,
    },
    /// The target duration is zero, negative, or not a number.
    NonPositiveDuration { ordinal: u32 },
}

impl std::fmt::Display for OrdinalIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrdinalIssue::Zero { index } => write!(f, "entry {index} has ordinal 0"),
            OrdinalIssue::Duplicate { ordinal, indices } => {
                write!(f, "ordinal {ordinal} used by entries {indices:?}")
            }
            OrdinalIssue::Gap { missing } => write!(f, "ordinal {missing} is never used"),
            OrdinalIssue::OutOfOrder {
                index,
                ordinal,
                previous,
            } => write!(
                f,
                "entry {index} (ordinal {ordinal}) follows ordinal {previous}"
            ),
            OrdinalIssue::NonPositiveDuration { ordinal } => {
                write!(f, "ordinal {ordinal} has a non-positive target duration")
            }
        }
    }
}

impl SegmentRegistry {
    pub fn new(segments: Vec<SegmentDescriptor>) -> Self {
        Self { segments }
    }

    /// The demo narrative compiled into the program.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_SEGMENTS
                .iter()
                .map(|(ordinal, title, stem, duration, narration)| {
                    SegmentDescriptor::new(
                        *ordinal,
                        *title,
                        format!("{stem}.png"),
                        format!("{stem}.wav"),
                        *duration,
                    )
                    .with_narration(*narration)
                })
                .collect(),
        )
    }

    /// Load a registry from a JSON manifest: either a bare array of
    /// segments or `{"segments": [ ... ]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| RegistryError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        let registry = match manifest {
            Manifest::List(segments) => Self::new(segments),
            Manifest::Wrapped(registry) => registry,
        };
        if registry.is_empty() {
            return Err(RegistryError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(registry)
    }

    /// Descriptors in registry order.
    pub fn descriptors(&self) -> &[SegmentDescriptor] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check that ordinals are dense from 1..N, unique, and ascending, and
    /// that every duration is positive.
    pub fn ordinal_issues(&self) -> Vec<OrdinalIssue> {
        let mut issues = vec![];
        let mut seen: BTreeMap<u32, Vec<usize>> = BTreeMap::new();

        for (index, segment) in self.segments.iter().enumerate() {
            if segment.ordinal == 0 {
                issues.push(OrdinalIssue::Zero { index });
            }
            if segment.target_duration_secs.is_nan() || segment.target_duration_secs <= 0.0 {
                issues.push(OrdinalIssue::NonPositiveDuration {
                    ordinal: segment.ordinal,
                });
            }
            if index > 0 {
                let previous = self.segments[index - 1].ordinal;
                if segment.ordinal < previous {
                    issues.push(OrdinalIssue::OutOfOrder {
                        index,
                        ordinal: segment.ordinal,
                        previous,
                    });
                }
            }
            seen.entry(segment.ordinal).or_default().push(index);
        }

        for (ordinal, indices) in &seen {
            if indices.len() > 1 {
                issues.push(OrdinalIssue::Duplicate {
                    ordinal: *ordinal,
                    indices: indices.clone(),
                });
            }
        }

        if let Some(max) = seen.keys().next_back().copied() {
            for missing in 1..max {
                if !seen.contains_key(&missing) {
                    issues.push(OrdinalIssue::Gap { missing });
                }
            }
        }

        issues
    }
}

/// Accepted manifest shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    List(Vec<SegmentDescriptor>),
    Wrapped(SegmentRegistry),
}

/// Errors that can occur when loading a registry manifest.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Manifest {path} lists no segments")]
    Empty { path: PathBuf },
}
