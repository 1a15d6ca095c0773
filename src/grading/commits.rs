//! Commit history analytics

use chrono::{DateTime, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::forge::Commit;

/// Calendar day of a commit in the commit's own UTC offset
pub fn commit_date(commit: &Commit) -> Option<NaiveDate> {
    match DateTime::parse_from_rfc3339(&commit.created_at) {
        Ok(timestamp) => Some(timestamp.date_naive()),
        Err(e) => {
            debug!(commit = %commit.id, created_at = %commit.created_at, error = %e, "unparseable commit timestamp");
            None
        }
    }
}

/// Number of commits per author name, in order of first appearance
pub fn commits_per_author(commits: &[Commit]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        match index.get(commit.author_name.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(commit.author_name.as_str(), order.len());
                order.push((commit.author_name.clone(), 1));
            }
        }
    }

    order
}

/// Number of commits per calendar day, ascending by date
pub fn commit_frequency(commits: &[Commit]) -> BTreeMap<NaiveDate, usize> {
    let mut frequency = BTreeMap::new();
    for date in commits.iter().filter_map(commit_date) {
        *frequency.entry(date).or_insert(0) += 1;
    }
    frequency
}

/// Commits made strictly after `start`
pub fn commits_after<'a, I>(commits: I, start: NaiveDate) -> Vec<&'a Commit>
where
    I: IntoIterator<Item = &'a Commit>,
{
    commits
        .into_iter()
        .filter(|commit| commit_date(commit).is_some_and(|date| date > start))
        .collect()
}

/// Commits made within `[start, end]`, both days included
pub fn commits_between<'a, I>(commits: I, start: NaiveDate, end: NaiveDate) -> Vec<&'a Commit>
where
    I: IntoIterator<Item = &'a Commit>,
{
    commits
        .into_iter()
        .filter(|commit| commit_date(commit).is_some_and(|date| start <= date && date <= end))
        .collect()
}

/// Oldest and newest commit day, or `None` when no commit has a usable date
pub fn date_range<'a, I>(commits: I) -> Option<(NaiveDate, NaiveDate)>
where
    I: IntoIterator<Item = &'a Commit>,
{
    commits
        .into_iter()
        .filter_map(commit_date)
        .fold(None, |range, date| match range {
            None => Some((date, date)),
            Some((first, last)) => Some((first.min(date), last.max(date))),
        })
}
