use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use bytes::Bytes;
use config::BlockConfig;
use dbformat::{Comparator, InternalKey, InternalKeyComparator, ValueType, MAX_SEQUENCE_NUMBER};
use iterator::SeekingIterator;
use memtable::MemTable;
use sstable::{Block, BlockBuilder, InternalTableIterator};
use tracing::{debug, info, warn};

/// What the REPL loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Print these lines and read the next command.
    Lines(Vec<String>),
    Exit,
}

impl Reply {
    fn line(s: impl Into<String>) -> Self {
        Reply::Lines(vec![s.into()])
    }
}

/// Shell state: pending writes in a memtable plus at most one open block.
pub struct Shell {
    config: BlockConfig,
    comparator: Arc<dyn Comparator>,
    memtable: MemTable,
    block: Option<Block>,
}

impl Shell {
    pub fn new(config: BlockConfig) -> Self {
        Self {
            config,
            comparator: Arc::new(InternalKeyComparator::default()),
            memtable: MemTable::new(),
            block: None,
        }
    }

    /// Runs one input line. Blank lines produce no output.
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Ok(Reply::Lines(Vec::new()));
        };
        let args: Vec<&str> = parts.collect();

        match cmd.to_uppercase().as_str() {
            "PUT" => self.put(&args),
            "DEL" => self.del(&args),
            "SEAL" => self.seal(&args),
            "OPEN" => self.open(&args),
            "SCAN" => self.scan(),
            "SEEK" => self.seek(&args),
            "GET" => self.get(&args),
            "STATS" => Ok(self.stats()),
            "EXIT" | "QUIT" => Ok(Reply::Exit),
            other => bail!("unknown command: {other}"),
        }
    }

    fn put(&mut self, args: &[&str]) -> Result<Reply> {
        let [key, seq, value @ ..] = args else {
            bail!("usage: PUT key seq value");
        };
        if value.is_empty() {
            bail!("usage: PUT key seq value");
        }
        let seq = parse_seq(seq)?;
        self.memtable
            .put(Bytes::copy_from_slice(key.as_bytes()), value.join(" "), seq)
            .context("put failed")?;
        Ok(Reply::line("OK"))
    }

    fn del(&mut self, args: &[&str]) -> Result<Reply> {
        let [key, seq] = args else {
            bail!("usage: DEL key seq");
        };
        let seq = parse_seq(seq)?;
        self.memtable
            .delete(Bytes::copy_from_slice(key.as_bytes()), seq)
            .context("del failed")?;
        Ok(Reply::line("OK"))
    }

    fn seal(&mut self, args: &[&str]) -> Result<Reply> {
        let [path] = args else {
            bail!("usage: SEAL path");
        };

        let mut builder = BlockBuilder::new(self.config.restart_interval, self.comparator.clone());
        let mut entries = self.memtable.iter();
        while entries.has_next() {
            let (key, value) = entries.next_entry()?;
            builder.add(&key.encode(), &value)?;
        }
        let count = builder.len();
        let bytes = builder.finish()?;

        if bytes.len() > self.config.block_size {
            warn!(
                size = bytes.len(),
                target = self.config.block_size,
                "sealed block exceeds the configured block size"
            );
        }
        fs::write(path, &bytes).with_context(|| format!("seal failed: cannot write {path}"))?;
        info!(path, entries = count, size = bytes.len(), "sealed block");

        self.memtable.clear();
        Ok(Reply::line(format!("OK ({count} entries, {} bytes)", bytes.len())))
    }

    fn open(&mut self, args: &[&str]) -> Result<Reply> {
        let [path] = args else {
            bail!("usage: OPEN path");
        };
        let raw = fs::read(path).with_context(|| format!("open failed: cannot read {path}"))?;
        let block = Block::new(Bytes::from(raw), self.comparator.clone())
            .with_context(|| format!("open failed: {path}"))?;
        debug!(path, ?block, "opened block");

        let reply = format!(
            "OK ({} bytes, {} restarts)",
            block.size(),
            block.restart_count()
        );
        self.block = Some(block);
        Ok(Reply::line(reply))
    }

    fn block_iter(&self) -> Result<InternalTableIterator<sstable::BlockIterator>> {
        let block = self
            .block
            .as_ref()
            .ok_or_else(|| anyhow!("no block open (use OPEN path)"))?;
        Ok(InternalTableIterator::new(block.iter()))
    }

    fn scan(&self) -> Result<Reply> {
        let entries = self.block_iter()?.collect_all().context("scan failed")?;
        if entries.is_empty() {
            return Ok(Reply::line("(empty)"));
        }
        let mut lines: Vec<String> = entries.iter().map(|(k, v)| format_entry(k, v)).collect();
        lines.push(format!("({} entries)", entries.len()));
        Ok(Reply::Lines(lines))
    }

    fn seek(&self, args: &[&str]) -> Result<Reply> {
        let (key, seq) = key_and_snapshot(args, "usage: SEEK key [seq]")?;
        let mut iter = self.block_iter()?;
        iter.seek(&target(key, seq)?).context("seek failed")?;
        if !iter.has_next() {
            return Ok(Reply::line("(end)"));
        }
        let (k, v) = iter.next_entry().context("seek failed")?;
        Ok(Reply::line(format_entry(&k, &v)))
    }

    fn get(&self, args: &[&str]) -> Result<Reply> {
        let (key, seq) = key_and_snapshot(args, "usage: GET key [seq]")?;
        let mut iter = self.block_iter()?;
        iter.seek(&target(key, seq)?).context("get failed")?;
        if !iter.has_next() {
            return Ok(Reply::line("(nil)"));
        }
        let (k, v) = iter.next_entry().context("get failed")?;
        if k.user_key().as_ref() != key.as_bytes() {
            return Ok(Reply::line("(nil)"));
        }
        Ok(Reply::line(match k.value_type() {
            ValueType::Value => String::from_utf8_lossy(&v).into_owned(),
            ValueType::Deletion => "(deleted)".to_string(),
        }))
    }

    fn stats(&self) -> Reply {
        let mut lines = vec![format!(
            "memtable: {} entries, ~{} bytes",
            self.memtable.len(),
            self.memtable.approx_size()
        )];
        lines.push(match &self.block {
            Some(block) => format!(
                "block: {} bytes, {} restarts",
                block.size(),
                block.restart_count()
            ),
            None => "block: (none)".to_string(),
        });
        lines.push(format!(
            "config: restart_interval={}, block_size={}",
            self.config.restart_interval, self.config.block_size
        ));
        Reply::Lines(lines)
    }
}

fn parse_seq(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| anyhow!("invalid sequence number: {raw}"))
}

fn key_and_snapshot<'a>(args: &[&'a str], usage: &str) -> Result<(&'a str, u64)> {
    match args {
        [key] => Ok((*key, MAX_SEQUENCE_NUMBER)),
        [key, seq] => Ok((*key, parse_seq(seq)?)),
        _ => bail!("{usage}"),
    }
}

/// Seek target for the newest version of `key` visible at `seq`.
fn target(key: &str, seq: u64) -> Result<InternalKey> {
    Ok(InternalKey::new(
        Bytes::copy_from_slice(key.as_bytes()),
        seq,
        ValueType::Value,
    )?)
}

fn format_entry(key: &InternalKey, value: &Bytes) -> String {
    format!(
        "{}@{}:{} -> {}",
        String::from_utf8_lossy(key.user_key()),
        key.sequence(),
        key.value_type(),
        String::from_utf8_lossy(value)
    )
}
