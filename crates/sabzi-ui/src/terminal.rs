use std::io::Write;

use sabzi_core::PriceComparison;
use sabzi_types::{ControlState, ImageSource, ToastKind};

use crate::notifier::Toast;
use crate::results::{ResultsView, rupees};

const RESET: &str = "\x1b[0m";

fn kind_color(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Info => "\x1b[36m",
        ToastKind::Success => "\x1b[32m",
        ToastKind::Warning => "\x1b[33m",
        ToastKind::Error => "\x1b[31m",
    }
}

/// Whether stdout should get ANSI colors
pub fn detect_color(forced: Option<bool>) -> bool {
    forced.unwrap_or_else(|| atty::is(atty::Stream::Stdout))
}

/// Line-oriented presentation surface
pub struct TerminalSurface<W: Write> {
    out: W,
    color: bool,
    last_toast: Option<u64>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            last_toast: None,
        }
    }

    /// Prints a toast once, when it first appears
    pub fn toast(&mut self, toast: Option<&Toast>) -> std::io::Result<()> {
        let Some(toast) = toast else {
            return Ok(());
        };
        if self.last_toast == Some(toast.id) {
            return Ok(());
        }
        self.last_toast = Some(toast.id);

        let label = toast.kind.label();
        if self.color {
            writeln!(
                self.out,
                "{}[{}]{} {}",
                kind_color(toast.kind),
                label,
                RESET,
                toast.message
            )?;
        } else {
            writeln!(self.out, "[{}] {}", label, toast.message)?;
        }
        self.out.flush()
    }

    pub fn results(&mut self, view: &ResultsView) -> std::io::Result<()> {
        self.out.write_all(view.render().as_bytes())?;
        self.out.flush()
    }

    pub fn captured(&mut self, width: u32, height: u32, source: ImageSource) -> std::io::Result<()> {
        let from = match source {
            ImageSource::Camera => "camera",
            ImageSource::File => "file",
        };
        writeln!(self.out, "Image ready: {width}x{height} from {from}")?;
        self.out.flush()
    }

    pub fn controls(&mut self, controls: ControlState) -> std::io::Result<()> {
        let mut enabled = Vec::new();
        if controls.camera {
            enabled.push("camera");
        }
        if controls.capture {
            enabled.push("capture");
        }
        if controls.upload {
            enabled.push("load");
        }
        if controls.detect {
            enabled.push("detect");
        }
        if controls.reset {
            enabled.push("reset");
        }

        if controls.detect_busy {
            writeln!(self.out, "Processing...")?;
        } else {
            writeln!(self.out, "Available: {}", enabled.join(", "))?;
        }
        self.out.flush()
    }

    pub fn comparison(&mut self, comparisons: &[PriceComparison]) -> std::io::Result<()> {
        if comparisons.is_empty() {
            writeln!(self.out, "Nothing to compare.")?;
            return self.out.flush();
        }

        for comparison in comparisons {
            writeln!(self.out, "{}", comparison.vegetable)?;
            for (location, price) in &comparison.quotes {
                let price = price.map(rupees).unwrap_or_else(|| "n/a".to_string());
                writeln!(self.out, "  {:<14} {:>10}", location.as_str(), price)?;
            }
            if let Some((location, price)) = comparison.cheapest() {
                writeln!(self.out, "  cheapest in {} at {}", location, rupees(price))?;
            }
        }
        self.out.flush()
    }

    pub fn text(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", text.trim_end())?;
        self.out.flush()
    }
}
