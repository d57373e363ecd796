//! Interactive front end: menu, prompts, and result formatting.
//!
//! Generic over the input and output streams so the prompt loops can be driven from
//! in-memory buffers in tests. Invalid input is reported and asked for again; the core
//! only ever sees validated requests.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::error::ValidationError;
use crate::query::validation::validate_author;
use crate::query::{QueryReport, QueryRequest, YearRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Query,
    KillServer,
    ListMembers,
    Leave,
    Rejoin,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Query),
            "2" => Some(Self::KillServer),
            "3" => Some(Self::ListMembers),
            "4" => Some(Self::Leave),
            "5" => Some(Self::Rejoin),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "\
[1] Query DBLP
[2] Disconnect a random server
[3] List group members
[4] Member leaves the group
[5] Member rejoins the group
[6] Exit";

pub struct Console<R, W> {
    lines: Lines<R>,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            lines: input.lines(),
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }

    /// Prints `prompt` and reads one line. `None` means the input is exhausted.
    pub async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub async fn read_menu_choice(&mut self) -> io::Result<Option<MenuChoice>> {
        loop {
            self.say(MENU).await?;
            let Some(line) = self.ask("Choice: ").await? else {
                return Ok(None);
            };
            match MenuChoice::parse(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => self.say("Please enter one of the listed choices").await?,
            }
        }
    }

    /// Asks for an author and a year range until both are valid.
    pub async fn prompt_query(&mut self) -> io::Result<Option<QueryRequest>> {
        loop {
            let Some(author) = self.prompt_author().await? else {
                return Ok(None);
            };
            let Some(years) = self.prompt_years().await? else {
                return Ok(None);
            };
            match QueryRequest::new(author, years) {
                Ok(request) => return Ok(Some(request)),
                Err(e) => self.reject(&e).await?,
            }
        }
    }

    async fn prompt_author(&mut self) -> io::Result<Option<String>> {
        loop {
            let Some(author) = self
                .ask("Author (full name, exact capitalisation): ")
                .await?
            else {
                return Ok(None);
            };
            match validate_author(&author) {
                Ok(()) => return Ok(Some(author)),
                Err(e) => self.reject(&e).await?,
            }
        }
    }

    async fn prompt_years(&mut self) -> io::Result<Option<YearRange>> {
        loop {
            let Some(input) = self
                .ask("Years as a closed interval, e.g. [2000,2005]; [-1,-1] for any: ")
                .await?
            else {
                return Ok(None);
            };
            match YearRange::parse(&input) {
                Ok(years) => return Ok(Some(years)),
                Err(e) => self.reject(&e).await?,
            }
        }
    }

    pub async fn prompt_address(&mut self, what: &str) -> io::Result<Option<String>> {
        self.ask(&format!(
            "Address of the member that {} (ip:port, e.g. 127.0.0.1:20001): ",
            what
        ))
        .await
    }

    async fn reject(&mut self, error: &ValidationError) -> io::Result<()> {
        self.say(&format!("Invalid input: {}. Please try again.", error)).await
    }

    pub async fn print_servers(&mut self, heading: &str, addresses: &[String]) -> io::Result<()> {
        self.say(&format!("{} ({})", heading, addresses.len())).await?;
        for address in addresses {
            self.say(&format!("  {}", address)).await?;
        }
        Ok(())
    }

    pub async fn print_report(&mut self, report: &QueryReport) -> io::Result<()> {
        if report.cancelled {
            self.say("Query cancelled; the count below is incomplete.").await?;
        }
        self.say(&format!(
            "Found {} matching article(s) in {:.3} seconds ({} chunk(s) from {} of {} server(s))",
            report.total,
            report.elapsed.as_secs_f64(),
            report.unique_chunks,
            report.nodes_answered(),
            report.nodes_queried
        ))
        .await?;

        for failure in &report.failures {
            self.say(&format!("  no answer from {}: {}", failure.address, failure.error)).await?;
        }
        if report.may_undercount {
            self.say("Note: not every chunk was reached, the real count may be higher!").await?;
        }
        Ok(())
    }
}
