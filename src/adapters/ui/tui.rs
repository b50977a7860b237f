//! Implements InputPort. Inquire-based interactive menu.
//!
//! Chat list (paged) -> download menu -> progress bar -> summary, with optional
//! printing of downloaded PDFs and opening the folder.

use crate::adapters::ui::progress::{follow_download, spinner};
use crate::adapters::ui::rtl::reshape;
use crate::domain::media::sanitize_chat_id;
use crate::domain::{
    Chat, DomainError, DownloadKind, DownloadResult, Duplex, PagesPerSheet, PrintJob,
    PrintOptions, SavedFile,
};
use crate::ports::{FolderOpener, InputPort};
use crate::usecases::{ChatService, DownloadService, PrintService};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use indicatif::MultiProgress;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, CustomUserError, InquireError, MultiSelect, Select, Text};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Green prompts for all subsequent inquire calls.
pub fn apply_theme() {
    let green = Color::rgb(0x25, 0xd3, 0x66);
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(green))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(green))
        .with_selected_checkbox(Styled::new("[x]").with_fg(green))
        .with_answer(StyleSheet::new().with_fg(green).with_attr(Attributes::BOLD));
    inquire::set_global_render_config(config);
}

/// Esc / Ctrl-C on a prompt means "go back", not an error.
fn answered<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn chat_label(chat: &Chat) -> String {
    let date = format_date(chat.timestamp);
    if date.is_empty() {
        reshape(&chat.name).into_owned()
    } else {
        format!("{}  ({})", reshape(&chat.name), date)
    }
}

/// Number of pages for `len` items; an empty list still has one (empty) page.
fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

enum ChatChoice {
    Chat(usize, String),
    Next,
    Prev,
    Exit,
}

impl fmt::Display for ChatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatChoice::Chat(_, label) => f.write_str(label),
            ChatChoice::Next => f.write_str("-> Next page"),
            ChatChoice::Prev => f.write_str("<- Previous page"),
            ChatChoice::Exit => f.write_str("Exit"),
        }
    }
}

/// Entries for one page: chats first, then navigation.
fn page_choices(chats: &[Chat], page: usize, page_size: usize) -> Vec<ChatChoice> {
    let size = page_size.max(1);
    let pages = page_count(chats.len(), size);
    let start = page * size;
    let mut choices: Vec<ChatChoice> = chats
        .iter()
        .enumerate()
        .skip(start)
        .take(size)
        .map(|(i, c)| ChatChoice::Chat(i, chat_label(c)))
        .collect();
    if page + 1 < pages {
        choices.push(ChatChoice::Next);
    }
    if page > 0 {
        choices.push(ChatChoice::Prev);
    }
    choices.push(ChatChoice::Exit);
    choices
}

enum ChatAction {
    Download(DownloadKind),
    OpenFolder,
    Back,
}

impl fmt::Display for ChatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatAction::Download(DownloadKind::Image) => f.write_str("Download images"),
            ChatAction::Download(DownloadKind::Pdf) => f.write_str("Download PDFs"),
            ChatAction::Download(DownloadKind::Office) => f.write_str("Download office documents"),
            ChatAction::OpenFolder => f.write_str("Open downloads folder"),
            ChatAction::Back => f.write_str("Back"),
        }
    }
}

struct FileChoice(SavedFile);

impl fmt::Display for FileChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.filename, self.0.size)
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    chats: Arc<ChatService>,
    downloads: Arc<DownloadService>,
    printing: Arc<PrintService>,
    opener: Arc<dyn FolderOpener>,
    page_size: usize,
}

impl TuiInputPort {
    pub fn new(
        chats: Arc<ChatService>,
        downloads: Arc<DownloadService>,
        printing: Arc<PrintService>,
        opener: Arc<dyn FolderOpener>,
        page_size: usize,
    ) -> Self {
        Self {
            chats,
            downloads,
            printing,
            opener,
            page_size: page_size.max(1),
        }
    }

    async fn chat_menu(&self, chat: &Chat) -> Result<(), DomainError> {
        loop {
            let mut actions: Vec<ChatAction> =
                DownloadKind::ALL.into_iter().map(ChatAction::Download).collect();
            actions.push(ChatAction::OpenFolder);
            actions.push(ChatAction::Back);

            let title = format!("{}: what to download?", reshape(&chat.name));
            let Some(action) = answered(Select::new(&title, actions).prompt())? else {
                return Ok(());
            };
            match action {
                ChatAction::Download(kind) => {
                    let result = self.download(chat, kind).await?;
                    self.after_download(kind, &result).await?;
                }
                ChatAction::OpenFolder => {
                    let folder = self.downloads.root().join(sanitize_chat_id(&chat.id));
                    if let Err(e) = self.opener.open_folder(&folder) {
                        warn!(error = %e, "open folder failed");
                        println!("Nothing downloaded for this chat yet.");
                    }
                }
                ChatAction::Back => return Ok(()),
            }
        }
    }

    async fn download(&self, chat: &Chat, kind: DownloadKind) -> Result<DownloadResult, DomainError> {
        let multi = MultiProgress::new();
        let pb = multi.add(spinner(format!(
            "Fetching {} from {}...",
            kind,
            reshape(&chat.name)
        )));
        let (tx, rx) = mpsc::unbounded_channel();
        let bar = tokio::spawn(follow_download(multi, pb.clone(), rx));

        let result = self.downloads.download_media(&chat.id, kind, Some(&tx)).await;
        drop(tx);
        let _ = bar.await;
        pb.finish_and_clear();

        let result = result?;
        println!(
            "Saved {} of {} {} file(s) to {}",
            result.saved,
            result.total,
            kind,
            result.folder.display()
        );
        Ok(result)
    }

    async fn after_download(&self, kind: DownloadKind, result: &DownloadResult) -> Result<(), DomainError> {
        if result.saved > 0 {
            let open = answered(Confirm::new("Open the folder?").with_default(false).prompt())?;
            if open == Some(true) {
                if let Err(e) = self.opener.open_folder(&result.folder) {
                    println!("Could not open folder: {}", e);
                }
            }
        }

        let pdfs: Vec<FileChoice> = result
            .files
            .iter()
            .filter(|f| f.filename.to_ascii_lowercase().ends_with(".pdf"))
            .cloned()
            .map(FileChoice)
            .collect();
        if kind == DownloadKind::Pdf && !pdfs.is_empty() {
            let print = answered(Confirm::new("Print these PDFs?").with_default(false).prompt())?;
            if print == Some(true) {
                self.print_flow(pdfs).await?;
            }
        }

        let _ = answered(Text::new("Press Enter to continue").prompt())?;
        Ok(())
    }

    async fn print_flow(&self, pdfs: Vec<FileChoice>) -> Result<(), DomainError> {
        let Some(selected) = answered(
            MultiSelect::new("Files to print", pdfs)
                .with_all_selected_by_default()
                .prompt(),
        )?
        else {
            return Ok(());
        };
        if selected.is_empty() {
            return Ok(());
        }
        let Some(options) = self.prompt_options().await? else {
            return Ok(());
        };

        let jobs: Vec<PrintJob> = selected
            .into_iter()
            .map(|f| PrintJob::new(f.0.path, options.clone()))
            .collect();
        let pb = spinner(format!("Sending {} file(s) to the printer...", jobs.len()));
        let outcome = self.printing.print_all(&jobs).await;
        pb.finish_and_clear();
        match outcome {
            Ok(n) => {
                info!(submitted = n, "print jobs submitted");
                println!("Submitted {} print job(s).", n);
            }
            Err(e) => println!("Printing stopped: {}", e),
        }
        Ok(())
    }

    async fn prompt_options(&self) -> Result<Option<PrintOptions>, DomainError> {
        let Some(duplex) = answered(
            Select::new("Duplex", vec![Duplex::None, Duplex::Long, Duplex::Short]).prompt(),
        )?
        else {
            return Ok(None);
        };
        let Some(color) = answered(Confirm::new("Color?").with_default(true).prompt())? else {
            return Ok(None);
        };
        let Some(copies) = answered(
            CustomType::<u32>::new("Copies")
                .with_default(1)
                .with_validator(|c: &u32| -> Result<Validation, CustomUserError> {
                    Ok(if *c >= 1 {
                        Validation::Valid
                    } else {
                        Validation::Invalid("at least one copy".into())
                    })
                })
                .prompt(),
        )?
        else {
            return Ok(None);
        };
        let Some(pages_per_sheet) = answered(
            Select::new("Pages per sheet", PagesPerSheet::ALL.to_vec()).prompt(),
        )?
        else {
            return Ok(None);
        };

        let list = self.printing.get_printers().await?;
        let printer = if list.printers.is_empty() {
            None
        } else {
            let cursor = list
                .printers
                .iter()
                .position(|p| *p == list.default)
                .unwrap_or(0);
            let Some(name) = answered(
                Select::new("Printer", list.printers)
                    .with_starting_cursor(cursor)
                    .prompt(),
            )?
            else {
                return Ok(None);
            };
            Some(name)
        };

        Ok(Some(PrintOptions {
            duplex,
            color,
            copies,
            pages_per_sheet,
            printer,
        }))
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let pb = spinner("Loading chats...");
        let chats = self.chats.list_chats().await;
        pb.finish_and_clear();
        let chats = chats?;
        info!(count = chats.len(), "chats loaded");

        let pages = page_count(chats.len(), self.page_size);
        let mut page = 0usize;
        loop {
            let title = format!("Chats (page {}/{})", page + 1, pages);
            let choices = page_choices(&chats, page, self.page_size);
            let Some(choice) = answered(
                Select::new(&title, choices)
                    .with_page_size(self.page_size + 3)
                    .prompt(),
            )?
            else {
                return Ok(());
            };
            match choice {
                ChatChoice::Chat(idx, _) => {
                    if let Some(chat) = chats.get(idx) {
                        self.chat_menu(chat).await?;
                    }
                }
                ChatChoice::Next => page += 1,
                ChatChoice::Prev => page = page.saturating_sub(1),
                ChatChoice::Exit => return Ok(()),
            }
        }
    }
}
