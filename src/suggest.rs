//! Near-miss name suggestions for ReferenceError diagnostics.
//!
//! When a name fails to resolve, the evaluator collects every name visible
//! in the scope chain and asks `find_similar` for the closest one within a
//! small edit distance.

/// Edit distance between two strings, single-row formulation.
///
/// `row[j]` holds the distance between the processed prefix of `a` and the
/// first `j` characters of `b`; `diag` carries the value the cell above-left
/// had before this row overwrote it.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitute = if ca == cb { diag } else { diag + 1 };
            diag = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diag + 1);
        }
    }

    row[b.len()]
}

/// Find the candidate closest to `word`, if any lies within `max_distance`.
/// Ties go to the earliest candidate, which for scope-chain callers means
/// the innermost binding.
pub fn find_similar<'a>(word: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;

    for &candidate in candidates {
        if candidate == word {
            continue;
        }
        let dist = edit_distance(word, candidate);
        if dist <= max_distance {
            match best {
                None => best = Some((candidate, dist)),
                Some((_, d)) if dist < d => best = Some((candidate, dist)),
                _ => {}
            }
        }
    }

    best.map(|(s, _)| s)
}
