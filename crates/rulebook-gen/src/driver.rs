//! Enumerates (construct, variant, arity) combinations and runs them in
//! dependency order.
//!
//! For every construct the void canonical template is derived and durably
//! written before any void expansion reads it back. Each expanded artifact
//! depends only on its own canonical template, never on a sibling arity.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::artifact::{ArtifactWriter, WriteOutcome};
use crate::config::{CANONICAL_ARITY, Config};
use crate::error::{GenError, Result};
use crate::rewrite::ArityExpander;
use crate::template::Template;
use crate::variant::VariantDeriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Value-returning (`Func`) family
    Value,
    /// Void (`Action`) family
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    DeriveVoid {
        construct: String,
    },
    Expand {
        construct: String,
        variant: Variant,
        arity: usize,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::DeriveVoid { construct } => write!(f, "derive void {}", construct),
            Step::Expand {
                construct,
                variant,
                arity,
            } => write!(f, "expand {:?} {} to arity {}", variant, construct, arity),
        }
    }
}

/// Ordered build steps. Every `Expand` of the void family comes after the
/// `DeriveVoid` of its construct.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    steps: Vec<Step>,
}

impl GenerationPlan {
    pub fn build(config: &Config) -> Self {
        let mut steps = Vec::new();
        for construct in &config.constructs {
            steps.push(Step::DeriveVoid {
                construct: construct.clone(),
            });
        }
        for arity in config.arities() {
            for construct in &config.constructs {
                for variant in [Variant::Value, Variant::Void] {
                    steps.push(Step::Expand {
                        construct: construct.clone(),
                        variant,
                        arity,
                    });
                }
            }
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[derive(Debug)]
pub struct ReportEntry {
    pub step: Step,
    pub destination: PathBuf,
    pub result: std::result::Result<WriteOutcome, GenError>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|entry| entry.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|entry| entry.result.is_err())
    }

    pub fn count(&self, outcome: WriteOutcome) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.result, Ok(o) if o == outcome))
            .count()
    }
}

pub struct Generator {
    config: Config,
    root: PathBuf,
    expander: ArityExpander,
    deriver: VariantDeriver,
    writer: ArtifactWriter,
}

impl Generator {
    /// `root` anchors relative directories and the source ids in markers.
    pub fn new(mut config: Config, root: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let root = root.into();
        config.resolve_dirs(&root);
        Ok(Self {
            expander: ArityExpander::new(&config.tokens),
            deriver: VariantDeriver::new(&config),
            writer: ArtifactWriter::new(),
            config,
            root,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn canonical_path(&self, construct: &str) -> PathBuf {
        self.config.source_dir.join(
            self.config
                .file_name(&self.config.value_construct(construct), CANONICAL_ARITY),
        )
    }

    pub fn artifact_path(&self, construct: &str, variant: Variant, arity: usize) -> PathBuf {
        let name = match variant {
            Variant::Value => self.config.value_construct(construct),
            Variant::Void => self.config.void_construct(construct),
        };
        self.config.output_dir.join(self.config.file_name(&name, arity))
    }

    /// Forward-slash path relative to the root, as shown in markers.
    fn source_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Load every canonical template. Any missing one aborts before writes.
    fn load_canonical(&self) -> Result<HashMap<String, Template>> {
        let mut templates = HashMap::new();
        for construct in &self.config.constructs {
            let path = self.canonical_path(construct);
            let template = Template::load(&path, self.source_id(&path), construct)?;
            templates.insert(construct.clone(), template);
        }
        Ok(templates)
    }

    pub fn run(&self) -> Result<RunReport> {
        let canonical = self.load_canonical()?;
        let plan = GenerationPlan::build(&self.config);
        let mut void_templates: HashMap<String, Template> = HashMap::new();
        let mut report = RunReport::default();

        for step in plan.steps() {
            log::debug!("{}", step);
            let (destination, result) = match step {
                Step::DeriveVoid { construct } => {
                    let destination = self.artifact_path(construct, Variant::Void, CANONICAL_ARITY);
                    let result = self
                        .derive_void(&canonical[construct], &destination, construct)
                        .map(|(template, outcome)| {
                            void_templates.insert(construct.clone(), template);
                            outcome
                        });
                    (destination, result)
                }
                Step::Expand {
                    construct,
                    variant,
                    arity,
                } => {
                    let destination = self.artifact_path(construct, *variant, *arity);
                    let source = match variant {
                        Variant::Value => canonical.get(construct),
                        Variant::Void => void_templates.get(construct),
                    };
                    let result = match source {
                        Some(source) => self.expand(source, &destination, *arity),
                        None => Err(GenError::MissingTemplate {
                            construct: self.config.void_construct(construct),
                            path: self.artifact_path(construct, Variant::Void, CANONICAL_ARITY),
                        }),
                    };
                    (destination, result)
                }
            };

            match result {
                Ok(outcome) => {
                    log::info!("{} {}", outcome, destination.display());
                    report.entries.push(ReportEntry {
                        step: step.clone(),
                        destination,
                        result: Ok(outcome),
                    });
                }
                Err(e @ GenError::MalformedExpansion { .. }) => return Err(e),
                Err(e) => {
                    log::warn!("{}: {}", step, e);
                    report.entries.push(ReportEntry {
                        step: step.clone(),
                        destination,
                        result: Err(e),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Write the void arity-1 template, then read it back as the source of
    /// the void family.
    fn derive_void(
        &self,
        template: &Template,
        destination: &Path,
        construct: &str,
    ) -> Result<(Template, WriteOutcome)> {
        let derived = self.deriver.derive(template)?;
        let artifact = self.writer.write(destination, &derived)?;
        let written = Template::load(destination, self.source_id(destination), construct)?;
        Ok((written, artifact.outcome))
    }

    fn expand(&self, template: &Template, destination: &Path, arity: usize) -> Result<WriteOutcome> {
        let mut expanded = self
            .expander
            .expand(template, arity)?
            .with_marker(template.source_id());
        if arity == 0 {
            expanded = expanded.with_directive(&self.config.directives.zero);
        }
        Ok(self.writer.write(destination, &expanded)?.outcome)
    }
}
