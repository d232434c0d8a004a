//! A terminal-backed editor host.
//!
//! "Opening" a destination prints its position and a few lines of
//! surrounding text, either read from disk or taken from content embedded
//! in the map.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use sourcenav_core::{
    ActiveDocument, EditorHost, Error, FileWatcher, Selection, WatchEvent, WatchSubscription,
};

pub struct TerminalHost {
    active: ActiveDocument,
    context: usize,
}

impl TerminalHost {
    pub fn new(active: ActiveDocument, context: usize) -> Self {
        Self { active, context }
    }

    fn print_destination(&self, label: &str, text: &str, selection: Selection) {
        println!("{}:{}:{}", label, selection.line + 1, selection.column + 1);

        let target = selection.line as usize;
        let first = target.saturating_sub(self.context);
        for (index, line) in text
            .lines()
            .enumerate()
            .skip(first)
            .take(self.context * 2 + 1)
        {
            let marker = if index == target { '>' } else { ' ' };
            println!("{marker} {:>5} | {line}", index + 1);
        }
    }
}

#[async_trait]
impl EditorHost for TerminalHost {
    fn active_document(&self) -> sourcenav_core::Result<ActiveDocument> {
        Ok(self.active.clone())
    }

    fn watch_file(
        &self,
        path: &Path,
        events: UnboundedSender<WatchEvent>,
    ) -> io::Result<Box<dyn WatchSubscription>> {
        let watcher = FileWatcher::watch(path, events).map_err(io::Error::other)?;
        Ok(Box::new(watcher))
    }

    async fn open_file(&self, path: &Path, selection: Selection) -> sourcenav_core::Result<()> {
        if !path.is_file() {
            return Err(Error::Destination(path.to_path_buf()));
        }
        let text = tokio::fs::read_to_string(path).await?;
        self.print_destination(&path.display().to_string(), &text, selection);
        Ok(())
    }

    async fn open_untitled(&self, text: &str, selection: Selection) -> sourcenav_core::Result<()> {
        self.print_destination("(embedded source)", text, selection);
        Ok(())
    }

    fn show_warning(&self, message: &str) {
        eprintln!("warning: {message}");
    }
}
