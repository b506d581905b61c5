//! Character trie with bounded Levenshtein search.
//!
//! Search walks the trie carrying one row of the edit-distance table per
//! node, so every dictionary entry sharing a prefix shares that prefix's
//! rows. A branch is abandoned once the smallest cell of its row exceeds
//! the cost bound.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TrieNode {
    word: Option<String>,
    children: BTreeMap<char, TrieNode>,
}

#[derive(Debug, Clone, Default)]
pub struct Trie {
    root: TrieNode,
    words: usize,
    nodes: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            if !node.children.contains_key(&c) {
                self.nodes += 1;
            }
            node = node.children.entry(c).or_default();
        }
        if node.word.is_none() {
            self.words += 1;
        }
        node.word = Some(word.to_string());
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Every stored word within `max_cost` edits of `word`, with its
    /// distance. Results are in trie (lexicographic) order.
    pub fn search(&self, word: &str, max_cost: usize) -> Vec<(String, usize)> {
        let target: Vec<char> = word.chars().collect();
        let first_row: Vec<usize> = (0..=target.len()).collect();
        let mut results = Vec::new();

        if let Some(stored) = &self.root.word {
            if target.len() <= max_cost {
                results.push((stored.clone(), target.len()));
            }
        }
        for (&letter, child) in &self.root.children {
            search_node(child, letter, &target, &first_row, max_cost, &mut results);
        }
        results
    }
}

fn search_node(
    node: &TrieNode,
    letter: char,
    target: &[char],
    previous: &[usize],
    max_cost: usize,
    results: &mut Vec<(String, usize)>,
) {
    let mut row = Vec::with_capacity(previous.len());
    row.push(previous[0] + 1);
    for column in 1..previous.len() {
        let insert_cost = row[column - 1] + 1;
        let delete_cost = previous[column] + 1;
        let replace_cost = if target[column - 1] == letter {
            previous[column - 1]
        } else {
            previous[column - 1] + 1
        };
        row.push(insert_cost.min(delete_cost).min(replace_cost));
    }

    let distance = row[row.len() - 1];
    if distance <= max_cost {
        if let Some(stored) = &node.word {
            results.push((stored.clone(), distance));
        }
    }

    if row.iter().min().is_some_and(|&m| m <= max_cost) {
        for (&next, child) in &node.children {
            search_node(child, next, target, &row, max_cost, results);
        }
    }
}

/// Plain Levenshtein distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            let replace = previous[j] + usize::from(ca != cb);
            row[j + 1] = replace.min(previous[j + 1] + 1).min(row[j] + 1);
        }
        previous = row;
    }
    previous[b.len()]
}
