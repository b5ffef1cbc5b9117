// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the Unveil demos.
//!
//! Pages describe their reveal timing as data in `pages.toml`; this crate
//! loads that table and mounts a page onto a [`RevealController`].
//!
//! Run:
//! - `cargo run -p unveil_demos --example landing_page`
//! - `cargo run -p unveil_demos --example scroll_page`

use std::path::Path;

use anyhow::{Context, Result, bail};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use unveil_reveal::{RevealConfig, RevealController, Section, SectionOptions, Step};
use unveil_timing::Clock;
use unveil_viewport::{IntersectionWatcher, ViewportWatcher};

/// The page table shipped with the demos.
pub const BUNDLED_PAGES: &str = include_str!("../pages.toml");

/// Every page and its sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTable {
    /// Pages in file order.
    #[serde(rename = "page")]
    pub pages: Vec<PageSpec>,
}

/// Which viewport watcher a page is driven by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatcherKind {
    /// Intersection ratio of each section with the viewport.
    #[default]
    Intersection,
    /// Scroll offset as a fraction of the viewport height.
    Scroll,
}

/// One page: a watcher choice and its sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    /// Page name, unique in the table.
    pub name: String,
    /// Watcher the page expects.
    #[serde(default)]
    pub watcher: WatcherKind,
    /// Controller settings, written inline as `default_threshold`.
    #[serde(flatten)]
    pub config: RevealConfig,
    /// Grows the viewport on every side, in pixels. Intersection pages only.
    #[serde(default)]
    pub root_margin: f64,
    /// Sections in document order.
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionSpec>,
}

/// A section as written in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Section id.
    pub id: String,
    /// Registration options, written inline as `threshold` and
    /// `auto_reveal_after_ms`.
    #[serde(flatten)]
    pub options: SectionOptions,
    /// Steps in declaration order.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A step as written in the table. Delays are signed so that a typo such as
/// `-100` is reported by name rather than as a TOML type error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step key.
    pub key: String,
    /// Delay from activation.
    pub delay_ms: i64,
}

impl PageTable {
    /// Parses a page table from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: Self = toml::from_str(text).context("failed to parse page table")?;
        table.check_names()?;
        Ok(table)
    }

    /// Loads a page table from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The table bundled with the demos.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_PAGES)
    }

    /// Looks up a page by name.
    pub fn page(&self, name: &str) -> Option<&PageSpec> {
        self.pages.iter().find(|page| page.name == name)
    }

    fn check_names(&self) -> Result<()> {
        for (i, page) in self.pages.iter().enumerate() {
            if self.pages[..i].iter().any(|other| other.name == page.name) {
                bail!("page {:?} is defined more than once", page.name);
            }
        }
        Ok(())
    }
}

impl PageSpec {
    /// Controller configuration for this page.
    pub fn config(&self) -> RevealConfig {
        self.config
    }

    /// An intersection watcher for this page's viewport and root margin.
    pub fn intersection_watcher(&self, viewport: Rect) -> IntersectionWatcher<String> {
        IntersectionWatcher::new(viewport).with_root_margin(self.root_margin)
    }

    /// Builds a controller for this page and registers every section.
    pub fn mount<W, C>(&self, watcher: W, clock: C) -> Result<RevealController<W, C>>
    where
        W: ViewportWatcher<String>,
        C: Clock,
    {
        let mut controller = RevealController::with_config(watcher, clock, self.config())
            .with_context(|| format!("page {:?} has an invalid configuration", self.name))?;
        for spec in &self.sections {
            let (section, options) = spec.to_section()?;
            controller
                .register_section_with(section, options)
                .with_context(|| {
                    format!("failed to mount {:?} on page {:?}", spec.id, self.name)
                })?;
        }
        log::info!(
            "mounted page {:?} with {} sections",
            self.name,
            controller.len()
        );
        Ok(controller)
    }
}

impl SectionSpec {
    /// Converts to a section descriptor and its options.
    pub fn to_section(&self) -> Result<(Section, SectionOptions)> {
        let steps = self
            .steps
            .iter()
            .map(|step| Step::try_new(step.key.as_str(), step.delay_ms))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("section {:?} has an invalid step", self.id))?;
        Ok((Section::with_steps(self.id.as_str(), steps), self.options))
    }
}

/// Style a view applies for a flag, as the pages' transition classes do.
pub fn transition_class(revealed: bool) -> &'static str {
    if revealed {
        "opacity-100 translate-y-0"
    } else {
        "opacity-0 translate-y-8"
    }
}
