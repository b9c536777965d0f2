use pipeline::coordinator::{ConvertEvent, ConvertEvents};
use simple_bar::ProgressBar;

/// Shows conversion progress on the terminal.
pub struct EventDisplayer {
    show_progress: bool,
    progress_bar: Option<ProgressBar>,
}

impl EventDisplayer {
    pub fn new(show_progress: bool) -> Self {
        EventDisplayer {
            show_progress,
            progress_bar: None,
        }
    }
}

impl ConvertEvents for EventDisplayer {
    fn on_event(&mut self, event: ConvertEvent) {
        match event {
            ConvertEvent::Started { total_pages } => {
                if self.show_progress && total_pages > 0 {
                    let total = u32::try_from(total_pages).unwrap_or(u32::MAX);
                    self.progress_bar = Some(ProgressBar::cargo_style(total, 80, true));
                }
            }
            ConvertEvent::PageFinished { .. } => {
                if let Some(progress_bar) = self.progress_bar.as_mut() {
                    progress_bar.update();
                }
            }
            ConvertEvent::DocumentCombined { .. } => {}
            ConvertEvent::DocumentSkipped { source_name } => {
                eprintln!("Error (continuing): no pages of {} were converted.", source_name);
            }
        }
    }
}
