#![allow(dead_code)]

use std::io;
use std::sync::Mutex;

use chrono::{Duration, TimeZone, Utc};
use wikigit_engine::{CommandOutput, CommandRunner, Invocation};

/// Timestamp of the synthetic revision with number `n`.
pub fn timestamp(n: usize) -> String {
    let base = Utc.with_ymd_and_hms(2004, 3, 1, 12, 0, 0).unwrap();
    (base + Duration::minutes(n as i64))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

pub fn revision_id(n: usize) -> String {
    (1000 + n).to_string()
}

/// Export document for revisions `range` of `title`. Every third revision is
/// anonymous; every fourth drops its second segment.
pub fn export_xml(title: &str, range: std::ops::Range<usize>) -> String {
    let mut xml = String::from(
        "<mediawiki xmlns=\"http://www.mediawiki.org/xml/export-0.11/\" version=\"0.11\">\n\
         <siteinfo><sitename>Wikipedia</sitename></siteinfo>\n<page>\n",
    );
    xml.push_str(&format!("<title>{title}</title><ns>0</ns><id>77</id>\n"));
    for n in range {
        let contributor = if n % 3 == 2 {
            format!("<contributor><ip>192.0.2.{n}</ip></contributor>")
        } else {
            format!(
                "<contributor><username>Editor {}</username><id>{}</id></contributor>",
                n % 2,
                40 + n % 2
            )
        };
        let second = if n % 4 == 3 {
            "<text bytes=\"0\" deleted=\"deleted\" />".to_string()
        } else {
            format!("<text xml:space=\"preserve\">Second part, rev {n}.</text>")
        };
        xml.push_str(&format!(
            "<revision><id>{id}</id><timestamp>{ts}</timestamp>{contributor}\
             <comment>edit &quot;{n}&quot; &amp; more</comment>\
             <text xml:space=\"preserve\">Intro {n}. Body text, with commas.&lt;br&gt;End</text>{second}\
             </revision>\n",
            id = revision_id(n),
            ts = timestamp(n),
        ));
    }
    xml.push_str("</page>\n</mediawiki>\n");
    xml
}

pub fn missing_article_xml() -> String {
    "<mediawiki><siteinfo><sitename>Wikipedia</sitename></siteinfo></mediawiki>".to_string()
}

/// Records every invocation; commands whose line starts with `fail_prefix`
/// exit with status 1.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: Mutex<Vec<Invocation>>,
    pub fail_prefix: Option<String>,
    pub stdout: Mutex<Vec<(String, String)>>,
}

impl RecordingRunner {
    pub fn failing_on(prefix: &str) -> Self {
        Self {
            fail_prefix: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    /// Answer commands starting with `prefix` with `stdout`.
    pub fn respond(&self, prefix: &str, stdout: &str) {
        self.stdout
            .lock()
            .unwrap()
            .push((prefix.to_string(), stdout.to_string()));
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.command_line.clone())
            .collect()
    }

    pub fn take(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().drain(..).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        if let Some(prefix) = &self.fail_prefix {
            if invocation.command_line.starts_with(prefix.as_str()) {
                return Ok(CommandOutput {
                    status: Some(1),
                    stdout: "partial output".to_string(),
                    stderr: "fatal: something broke".to_string(),
                });
            }
        }
        let stdout = self
            .stdout
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| invocation.command_line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        Ok(CommandOutput {
            status: Some(0),
            stdout,
            stderr: String::new(),
        })
    }
}
