/// Command line options
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gears-terminal", version, about = "Three rotating gears rendered in the terminal")]
pub struct Options {
    /// Buffer swap delay in microseconds
    #[arg(short = 'd', long = "delay", value_name = "US", default_value_t = 0)]
    pub delay: u64,

    /// Run in fullscreen mode
    #[arg(short = 'f', long)]
    pub fullscreen: bool,

    /// Create an opaque surface
    #[arg(short = 'o', long)]
    pub opaque: bool,

    /// Use a 16 color palette instead of 24-bit color
    #[arg(short = 's', long = "sixteen-colors")]
    pub reduced_color: bool,

    /// Don't sync to the terminal refresh rate
    #[arg(short = 'b', long = "no-sync")]
    pub no_sync: bool,
}

/// Color output of the terminal surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    TrueColor,
    Ansi16,
}

/// Runtime configuration derived from [`Options`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub delay: Duration,
    pub fullscreen: bool,
    pub opaque: bool,
    pub color_depth: ColorDepth,
    pub frame_sync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Options::default().into()
    }
}

impl From<Options> for Config {
    fn from(options: Options) -> Self {
        Self {
            delay: Duration::from_micros(options.delay),
            fullscreen: options.fullscreen,
            opaque: options.opaque,
            color_depth: if options.reduced_color {
                ColorDepth::Ansi16
            } else {
                ColorDepth::TrueColor
            },
            frame_sync: !options.no_sync,
        }
    }
}
