use crate::error::{Error, Result};
use crate::model::settings::{Language, Settings};
use crate::services::ai::TextGenerator;
use crate::services::ai_types::{TranslateReport, TranslationPair};
use crate::services::prompt;

use tracing::{error, info, warn};

use std::{thread, time::Duration};

/// Wait after a failed chunk before moving on to the next one.
pub const FAILURE_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub language: Language,
    pub chunk_size: usize,
    /// Pause before every chunk except the first.
    pub delay: Duration,
    pub failure_backoff: Duration,
    pub custom_prompt: Option<String>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions::from_settings(&Settings::default())
    }
}

impl TranslateOptions {
    pub fn from_settings(s: &Settings) -> Self {
        TranslateOptions {
            language: s.language,
            chunk_size: s.chunk_size,
            delay: Duration::from_secs(s.delay_seconds),
            failure_backoff: FAILURE_BACKOFF,
            custom_prompt: s.custom_prompt().map(str::to_string),
        }
    }
}

pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    len.div_ceil(chunk_size)
}

/// Translates `names` chunk by chunk, matching response lines to names by position.
///
/// A chunk whose request fails yields no pairs; the run continues with the
/// next chunk after `failure_backoff`. `progress` receives
/// `(processed, total)` before the first chunk and after every chunk.
pub fn translate<G, P>(
    generator: &G,
    names: &[String],
    opts: &TranslateOptions,
    mut progress: P,
) -> Result<TranslateReport>
where
    G: TextGenerator + ?Sized,
    P: FnMut(usize, usize),
{
    if opts.chunk_size == 0 {
        return Err(Error::InvalidChunkSize);
    }

    let total = names.len();
    let chunks_total = chunk_count(total, opts.chunk_size);

    let mut report = TranslateReport {
        chunks_total,
        ..TranslateReport::default()
    };

    info!(
        language = %opts.language,
        chunk_size = opts.chunk_size,
        delay_secs = opts.delay.as_secs_f64(),
        names = total,
        "starting batch translation"
    );

    progress(0, total);

    for (i, chunk) in names.chunks(opts.chunk_size).enumerate() {
        if i > 0 && !opts.delay.is_zero() {
            info!(
                "waiting {:?} between chunks ({}/{})",
                opts.delay, i, chunks_total
            );
            thread::sleep(opts.delay);
        }

        let processed = (i * opts.chunk_size + chunk.len()).min(total);
        let prompt = prompt::build_prompt(opts.language, opts.custom_prompt.as_deref(), chunk);

        info!(
            chunk = i + 1,
            of = chunks_total,
            input_len = prompt.len(),
            "requesting translation"
        );

        match generator.generate(&prompt) {
            Ok(text) => {
                let before = report.pairs.len();
                zip_response(chunk, &text, &mut report);
                info!(
                    chunk = i + 1,
                    response_len = text.len(),
                    translated = report.pairs.len() - before,
                    "chunk translated"
                );
            }
            Err(e) => {
                error!(chunk = i + 1, error = %e, "chunk translation failed");
                report.chunks_failed += 1;
                if i + 1 < chunks_total && !opts.failure_backoff.is_zero() {
                    info!("backing off {:?} before the next chunk", opts.failure_backoff);
                    thread::sleep(opts.failure_backoff);
                }
            }
        }

        progress(processed, total);
    }

    if report.pairs.is_empty() {
        return Err(Error::NothingTranslated);
    }

    info!(
        translated = report.pairs.len(),
        missing = report.missing.len(),
        failed_chunks = report.chunks_failed,
        "batch translation finished"
    );

    Ok(report)
}

fn zip_response(chunk: &[String], response: &str, report: &mut TranslateReport) {
    let lines: Vec<&str> = response.trim().split('\n').collect();

    for (j, original) in chunk.iter().enumerate() {
        match lines.get(j).map(|l| l.trim()) {
            Some(t) if !t.is_empty() => report.pairs.push(TranslationPair {
                original: original.clone(),
                translated: t.to_string(),
            }),
            _ => {
                warn!(file = %original, "translation missing from response");
                report.missing.push(original.clone());
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{fast_options, ScriptedGenerator};
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("file{i}.txt")).collect()
    }

    fn echo_reply(chunk: &[String]) -> String {
        chunk
            .iter()
            .map(|n| format!("T-{n}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn chunk_count_is_ceiling() {
        assert_eq!(chunk_count(0, 10), 0);
        assert_eq!(chunk_count(10, 10), 1);
        assert_eq!(chunk_count(11, 10), 2);
        assert_eq!(chunk_count(25, 4), 7);
    }

    #[test]
    fn one_request_per_chunk_with_last_chunk_smaller() {
        let input = names(7);
        let replies: Vec<String> = input.chunks(3).map(echo_reply).collect();
        let refs: Vec<&str> = replies.iter().map(String::as_str).collect();
        let gen = ScriptedGenerator::ok(&refs);

        let report = translate(&gen, &input, &fast_options(3), |_, _| {}).unwrap();

        let prompts = gen.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].ends_with("\n\nfile6.txt"));
        assert_eq!(report.chunks_total, 3);
        assert_eq!(report.pairs.len(), 7);
        for (i, pair) in report.pairs.iter().enumerate() {
            assert_eq!(pair.original, input[i]);
            assert_eq!(pair.translated, format!("T-{}", input[i]));
        }
    }

    #[test]
    fn short_response_never_fabricates_pairs() {
        let input = names(3);
        let gen = ScriptedGenerator::ok(&["one\n   \n"]);

        let report = translate(&gen, &input, &fast_options(10), |_, _| {}).unwrap();

        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].original, "file0.txt");
        assert_eq!(report.pairs[0].translated, "one");
        assert_eq!(report.missing, vec!["file1.txt".to_string(), "file2.txt".to_string()]);
    }

    #[test]
    fn failed_chunk_is_skipped_and_run_continues() {
        let input = names(4);
        let gen = ScriptedGenerator::new(vec![
            Err(Error::Http {
                status: 503,
                message: "overloaded".into(),
            }),
            Ok("c\nd".into()),
        ]);

        let report = translate(&gen, &input, &fast_options(2), |_, _| {}).unwrap();

        assert_eq!(report.chunks_failed, 1);
        let originals: Vec<&str> = report.pairs.iter().map(|p| p.original.as_str()).collect();
        assert_eq!(originals, vec!["file2.txt", "file3.txt"]);
        assert_eq!(gen.prompts.lock().unwrap().len(), 2);
    }

    #[test]
    fn all_chunks_failing_is_an_error() {
        let input = names(2);
        let gen = ScriptedGenerator::new(vec![Err(Error::InvalidResponse("x".into()))]);

        let res = translate(&gen, &input, &fast_options(5), |_, _| {});
        assert!(matches!(res, Err(Error::NothingTranslated)));
    }

    #[test]
    fn zero_chunk_size_is_rejected_before_any_request() {
        let gen = ScriptedGenerator::ok(&["a"]);
        let res = translate(&gen, &names(1), &fast_options(0), |_, _| {});
        assert!(matches!(res, Err(Error::InvalidChunkSize)));
        assert!(gen.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn progress_reports_after_each_chunk() {
        let input = names(5);
        let gen = ScriptedGenerator::ok(&["a\nb", "c\nd", "e"]);
        let mut seen = Vec::new();

        translate(&gen, &input, &fast_options(2), |done, total| seen.push((done, total))).unwrap();

        assert_eq!(seen, vec![(0, 5), (2, 5), (4, 5), (5, 5)]);
    }

    /// Records when each request arrives.
    struct Timed {
        inner: ScriptedGenerator,
        calls: std::sync::Mutex<Vec<std::time::Instant>>,
    }

    impl TextGenerator for Timed {
        fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.lock().unwrap().push(std::time::Instant::now());
            self.inner.generate(prompt)
        }
    }

    #[test]
    fn waits_between_chunks_and_backs_off_after_failures() {
        let delay = Duration::from_millis(100);
        let backoff = Duration::from_millis(150);
        let gen = Timed {
            inner: ScriptedGenerator::new(vec![
                Err(Error::InvalidResponse("x".into())),
                Ok("c\nd".into()),
                Err(Error::InvalidResponse("y".into())),
            ]),
            calls: std::sync::Mutex::new(Vec::new()),
        };
        let opts = TranslateOptions {
            delay,
            failure_backoff: backoff,
            ..fast_options(2)
        };

        let start = std::time::Instant::now();
        let report = translate(&gen, &names(5), &opts, |_, _| {}).unwrap();
        let end = std::time::Instant::now();

        assert_eq!(report.chunks_failed, 2);
        let calls = gen.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        // No wait before the first chunk.
        assert!(calls[0] - start < delay);
        // Back-off after the failed chunk, then the regular delay.
        assert!(calls[1] - calls[0] >= delay + backoff);
        assert!(calls[2] - calls[1] >= delay);
        assert!(calls[2] - calls[1] < delay + backoff);
        // Nothing follows the last chunk, so no back-off.
        assert!(end - calls[2] < backoff);
    }

    #[test]
    fn crlf_responses_are_trimmed() {
        let input = names(2);
        let gen = ScriptedGenerator::ok(&["  alpha\r\nbeta\r\n"]);

        let report = translate(&gen, &input, &fast_options(10), |_, _| {}).unwrap();
        assert_eq!(report.pairs[0].translated, "alpha");
        assert_eq!(report.pairs[1].translated, "beta");
    }
}
