//! Terminal rendering of datasets, conversation lists and transcripts

use crate::api::types::{display_value, ConversationSummary, DatasetInfo};
use crate::chat::transcript::{Message, Role};
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::io::Write;

/// Build the data preview table
///
/// Columns follow `dataset.columns` order; a row missing a column shows an
/// empty cell. Returns `None` when the dataset has no preview.
pub fn preview_table(dataset: &DatasetInfo) -> Option<Table> {
    let preview = dataset.preview.as_ref()?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        dataset
            .columns
            .iter()
            .map(|c| Cell::new(c).style_spec("b"))
            .collect(),
    ));

    for row in preview {
        table.add_row(Row::new(
            dataset
                .columns
                .iter()
                .map(|col| Cell::new(&row.get(col).map(display_value).unwrap_or_default()))
                .collect(),
        ));
    }

    Some(table)
}

/// Print the dataset header and preview
pub fn print_dataset(dataset: &DatasetInfo) {
    println!("\n{} {}", "Dataset:".bold(), dataset.filename.cyan());
    if let Some(table) = preview_table(dataset) {
        println!("{}", "Data Preview".bold());
        table.printstd();
    }
    println!();
}

/// Build the conversation list table, marking the open session
pub fn conversations_table(conversations: &[ConversationSummary], current: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(prettytable::row![b->"", b->"ID", b->"Title"]);

    for conv in conversations {
        let marker = if Some(conv.id.as_str()) == current {
            "*"
        } else {
            ""
        };
        table.add_row(prettytable::row![marker, conv.id.cyan(), truncate(&conv.title, 50)]);
    }

    table
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn role_label(role: Role) -> String {
    match role {
        Role::User => "you".bold().to_string(),
        Role::Assistant => "assistant".red().bold().to_string(),
    }
}

/// Render assistant markdown for the terminal
///
/// Bold and italic spans keep their emphasis, code is shown in cyan with
/// fenced blocks indented, and list items get `-` or number markers.
/// Paragraphs are separated by one blank line.
pub fn render_markdown(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut strong = 0usize;
    let mut emphasis = 0usize;
    let mut in_code_block = false;
    let mut lists: Vec<Option<u64>> = Vec::new();

    let flush = |line: &mut String, lines: &mut Vec<String>| {
        if !line.is_empty() {
            lines.push(std::mem::take(line));
        }
    };

    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        if in_code_block {
            match event {
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    lines.push(String::new());
                }
                Event::Text(code) => {
                    for code_line in code.lines() {
                        lines.push(format!("    {}", code_line.cyan()));
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::Heading { .. }) => {
                flush(&mut line, &mut lines);
                strong += 1;
            }
            Event::Start(Tag::Strong) => strong += 1,
            Event::End(TagEnd::Strong) => strong = strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => emphasis += 1,
            Event::End(TagEnd::Emphasis) => emphasis = emphasis.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut line, &mut lines);
                in_code_block = true;
            }
            Event::Start(Tag::List(start)) => {
                flush(&mut line, &mut lines);
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                flush(&mut line, &mut lines);
                lists.pop();
                lines.push(String::new());
            }
            Event::Start(Tag::Item) => {
                flush(&mut line, &mut lines);
                match lists.last_mut() {
                    Some(Some(n)) => {
                        line.push_str(&format!("{}. ", n));
                        *n += 1;
                    }
                    _ => line.push_str("- "),
                }
            }
            Event::End(TagEnd::Item) => flush(&mut line, &mut lines),
            Event::End(TagEnd::Heading(_)) => {
                strong = strong.saturating_sub(1);
                flush(&mut line, &mut lines);
                lines.push(String::new());
            }
            Event::End(TagEnd::Paragraph) => {
                flush(&mut line, &mut lines);
                lines.push(String::new());
            }
            Event::Text(span) => line.push_str(&styled(&span, strong > 0, emphasis > 0)),
            Event::Code(code) => line.push_str(&code.cyan().to_string()),
            Event::SoftBreak => line.push(' '),
            Event::HardBreak => flush(&mut line, &mut lines),
            Event::Rule => {
                flush(&mut line, &mut lines);
                lines.push("─".repeat(40));
            }
            _ => {}
        }
    }

    flush(&mut line, &mut lines);
    while lines.last().map_or(false, |l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn styled(text: &str, bold: bool, italic: bool) -> String {
    match (bold, italic) {
        (true, true) => text.bold().italic().to_string(),
        (true, false) => text.bold().to_string(),
        (false, true) => text.italic().to_string(),
        (false, false) => text.to_string(),
    }
}

/// Print a complete message
///
/// Assistant messages are rendered as markdown; user input is shown as typed.
pub fn print_message(message: &Message) {
    println!("{}:", role_label(message.role));
    match message.role {
        Role::Assistant => println!("{}\n", render_markdown(&message.content)),
        Role::User => println!("{}\n", message.content),
    }
}

/// Print a whole transcript
pub fn print_transcript(messages: &[Message]) {
    for message in messages {
        print_message(message);
    }
}

/// Incremental printer for the in-progress assistant message
///
/// Each snapshot extends the previous one, so only the unseen suffix is
/// written.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: usize,
    started: bool,
}

impl StreamPrinter {
    /// Create a printer with nothing printed yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of `snapshot` not yet printed
    pub fn unseen<'a>(&self, snapshot: &'a Message) -> &'a str {
        snapshot.content.get(self.printed..).unwrap_or_default()
    }

    /// Write the unseen suffix of `snapshot` to stdout
    pub fn update(&mut self, snapshot: &Message) {
        let mut stdout = std::io::stdout().lock();
        if !self.started {
            let _ = writeln!(stdout, "{}:", role_label(snapshot.role));
            self.started = true;
        }
        let _ = write!(stdout, "{}", self.unseen(snapshot));
        let _ = stdout.flush();
        self.printed = snapshot.content.len();
    }

    /// Terminate the streamed block
    pub fn finish(&self) {
        if self.started {
            println!("\n");
        }
    }
}
