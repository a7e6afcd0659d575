use std::{
    collections::VecDeque,
    io::SeekFrom,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, Result};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncSeekExt, BufReader},
    time::{Duration, interval},
};

use super::init::LOG_FILE_PREFIX;

/// Print the tail of the newest log file in `log_dir`, optionally following it.
pub async fn show_logs(log_dir: &Path, follow: bool, lines: usize) -> Result<()> {
    let Some(log_path) = find_latest_log_file(log_dir).await? else {
        println!("No log file found. The loop may not have been started yet.");
        return Ok(());
    };

    for line in last_lines(&log_path, lines).await? {
        println!("{line}");
    }

    if follow {
        follow_file(&log_path).await?;
    }

    Ok(())
}

/// Newest `autopush.log*` file by modification time.
pub async fn find_latest_log_file(log_dir: &Path) -> Result<Option<PathBuf>> {
    if !log_dir.exists() {
        return Ok(None);
    }

    let mut entries = tokio::fs::read_dir(log_dir)
        .await
        .with_context(|| format!("failed to read {}", log_dir.display()))?;
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await? {
        if !entry
            .file_name()
            .to_string_lossy()
            .starts_with(LOG_FILE_PREFIX)
        {
            continue;
        }
        let modified = entry
            .metadata()
            .await
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if newest.as_ref().is_none_or(|(t, _)| modified >= *t) {
            newest = Some((modified, entry.path()));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// Last `n` lines of `path`.
pub async fn last_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut buffer = VecDeque::with_capacity(n);

    while let Some(line) = lines.next_line().await? {
        if n == 0 {
            continue;
        }
        if buffer.len() == n {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }

    Ok(buffer.into())
}

async fn follow_file(path: &Path) -> Result<()> {
    let mut file = File::open(path).await?;
    let mut last_size = file.metadata().await?.len();

    file.seek(SeekFrom::End(0)).await?;

    let mut ticker = interval(Duration::from_millis(250));

    loop {
        ticker.tick().await;

        let current_size = tokio::fs::metadata(path).await?.len();

        if current_size > last_size {
            let mut reader = BufReader::new(&mut file);
            let mut line = String::new();

            while reader.read_line(&mut line).await? > 0 {
                print!("{line}");
                line.clear();
            }

            last_size = current_size;
        } else if current_size < last_size {
            // Truncated or rotated: start over from the beginning.
            file = File::open(path).await?;
            last_size = 0;
        }
    }
}
