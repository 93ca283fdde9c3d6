use super::engine::RunEvents;
use super::types::*;

use std::io::Write;

/// Consumer of a run's presentation events.
pub trait Renderer: Send {
    fn render(&mut self, event: &PresentationEvent);
}

/// Writes one line per event.
pub struct ConsoleRenderer<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, event: &PresentationEvent) {
        let line = describe(event);
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::debug!("Console renderer write failed: {}", e);
        }
    }
}

/// Logs every event instead of drawing it.
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&mut self, event: &PresentationEvent) {
        match event {
            PresentationEvent::MarkDown { .. } => tracing::warn!("{}", describe(event)),
            PresentationEvent::Terminal { outcome } if !outcome.is_success() => {
                tracing::warn!("{}", describe(event))
            }
            _ => tracing::info!("{}", describe(event)),
        }
    }
}

/// Feeds every event to `renderer` until the stream closes.
pub async fn drive(mut events: RunEvents, renderer: &mut dyn Renderer) -> Option<Outcome> {
    let mut terminal = None;
    while let Some(event) = events.next().await {
        renderer.render(&event);
        if let PresentationEvent::Terminal { outcome } = event {
            terminal = Some(outcome);
        }
    }
    terminal
}

pub fn describe(event: &PresentationEvent) -> String {
    match event {
        PresentationEvent::HighlightBox { component } => format!("[*] {}", component),
        PresentationEvent::HighlightArrow { hop, direction } => match direction {
            Direction::Forward => format!("    {} --> {}", hop.from, hop.to),
            Direction::Reverse => format!("    {} <-- {}", hop.from, hop.to),
        },
        PresentationEvent::MarkDown { component } => format!("[x] {} is down", component),
        PresentationEvent::Terminal { outcome } => match outcome {
            Outcome::Success { message, .. } => format!("SUCCESS: {}", message),
            Outcome::Failure { stage, message, .. } => format!("FAILED [{}]: {}", stage, message),
        },
    }
}
