use thiserror::Error;

use crate::dashboard::Action;
use crate::filters::{FilterEdit, FilterField, FilterValue};
use crate::table::SortKey;
use crate::utils;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type `help` for a list)")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("{0}")]
    InvalidField(String),

    #[error("`{command}`: {message}")]
    InvalidNumber {
        command: &'static str,
        message: String,
    },

    #[error("{0}")]
    InvalidSort(String),
}

pub const HELP: &str = "\
commands:
  set <field> <values>   edit a filter (lists are comma-separated)
  clear <field>          clear one filter
  entity <name>          pick a legal entity (clears the sub-entity)
  apply                  fetch page 1 with the edited filters
  reset                  clear all filters
  search [text]          filter rows on this page by name
  sort [key|none]        sort rows on this page
  page <n>               go to page n
  size <n>               rows per page
  retry                  reissue the last failed request
  show                   redraw the view
  panel                  collapse or expand the filter panel
  catalog                list filter options
  url                    print the current address
  help                   this text
  quit                   leave
fields: legalEntity, subEntity, department, designation, status, skills, salaryRange";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Set(FilterEdit),
    Entity(String),
    Apply,
    Reset,
    Search(String),
    Sort(Option<SortKey>),
    Page(u32),
    Size(u32),
    Retry,
    Show,
    Panel,
    Catalog,
    Url,
    Help,
    Quit,
}

impl Command {
    /// The dashboard action behind this command, if it mutates the view.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Self::Set(edit) => Some(Action::Edit(edit)),
            Self::Entity(name) => Some(Action::LegalEntity(name)),
            Self::Apply => Some(Action::Apply),
            Self::Reset => Some(Action::Reset),
            Self::Search(text) => Some(Action::Search(text)),
            Self::Sort(key) => Some(Action::Sort(key)),
            Self::Page(n) => Some(Action::Page(n)),
            Self::Size(n) => Some(Action::PageSize(n)),
            Self::Panel => Some(Action::TogglePanel),
            Self::Retry | Self::Show | Self::Catalog | Self::Url | Self::Help | Self::Quit => None,
        }
    }
}

/// Builds the edit for `field` from raw user text. List fields split on
/// commas; single-valued fields keep the text as is.
pub fn edit_from_text(field: FilterField, raw: &str) -> FilterEdit {
    let value = if field.is_multi() {
        FilterValue::Many(utils::parse_csv_list(raw))
    } else {
        FilterValue::Single(raw.trim().to_string())
    };
    FilterEdit::new(field, value)
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn number(command: &'static str, raw: &str) -> Result<u32, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            expected: "a positive number",
        });
    }
    utils::parse_positive_u32(raw).map_err(|message| CommandError::InvalidNumber { command, message })
}

/// Parses one shell line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = split_word(line);
    let command = match word.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, values) = split_word(rest);
            if field.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "set",
                    expected: "a field and values",
                });
            }
            let field = field.parse::<FilterField>().map_err(CommandError::InvalidField)?;
            if field == FilterField::LegalEntity {
                Command::Entity(values.to_string())
            } else {
                Command::Set(edit_from_text(field, values))
            }
        }
        "clear" | "unset" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "clear",
                    expected: "a field",
                });
            }
            let field = rest.parse::<FilterField>().map_err(CommandError::InvalidField)?;
            if field == FilterField::LegalEntity {
                Command::Entity(String::new())
            } else {
                Command::Set(edit_from_text(field, ""))
            }
        }
        "entity" => Command::Entity(rest.to_string()),
        "apply" => Command::Apply,
        "reset" => Command::Reset,
        "search" | "find" => Command::Search(rest.to_string()),
        "sort" => match rest.to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Command::Sort(None),
            _ => Command::Sort(Some(rest.parse::<SortKey>().map_err(CommandError::InvalidSort)?)),
        },
        "page" => Command::Page(number("page", rest)?),
        "size" | "page-size" => Command::Size(number("size", rest)?),
        "retry" => Command::Retry,
        "show" | "ls" => Command::Show,
        "panel" | "toggle" => Command::Panel,
        "catalog" | "options" => Command::Catalog,
        "url" => Command::Url,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
