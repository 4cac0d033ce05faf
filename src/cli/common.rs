//! Shared clap helper types for CLI commands.

use clap::ValueEnum;
use washlabel::PatternStyle;
use washlabel::image::PageLayout;

/// Text views available for `washlabel encode`.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PatternStyleArg {
    #[value(name = "ascii-01")]
    Ascii01,
    Blocks,
}

impl From<PatternStyleArg> for PatternStyle {
    fn from(value: PatternStyleArg) -> Self {
        match value {
            PatternStyleArg::Ascii01 => PatternStyle::Ascii01,
            PatternStyleArg::Blocks => PatternStyle::Blocks,
        }
    }
}

/// Output page layout options for PNG rendering.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PageLayoutArg {
    Tight,
    A4,
}

impl From<PageLayoutArg> for PageLayout {
    fn from(value: PageLayoutArg) -> PageLayout {
        match value {
            PageLayoutArg::Tight => PageLayout::Tight,
            PageLayoutArg::A4 => PageLayout::A4,
        }
    }
}
