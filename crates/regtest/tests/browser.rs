//! Real-browser tests of the observer and bridge.
//!
//! These need Chrome/Chromium and are `#[ignore]`d by default. Run with:
//! `cargo test -p regtest -- --ignored`

use regtest::{Chrome, ChromeConfig, RunOptions, Runner, SilentReporter, TestFile};
use regtest::wait::WaitConfig;
use std::time::Duration;
use url::Url;

/// Local file pages load almost instantly.
const QUICK_LOAD: WaitConfig = WaitConfig {
    timeout: Duration::from_secs(10),
    poll_interval: Duration::from_millis(20),
};

/// A minimal GlkOte-shaped page: one buffer window with a line input that
/// echoes what it is given.
const ECHO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Echo</title></head>
<body>
<div id="windowport">
  <div class="WindowFrame BufferWindow" id="window1">
    <div class="BufferWindowInner">
      <div class="BufferLine">Welcome to Echo.</div>
    </div>
    <input class="Input LineInput" id="win1_input">
  </div>
</div>
<script>
  const input = document.getElementById('win1_input')
  const inner = document.querySelector('.BufferWindowInner')
  input.addEventListener('keypress', event => {
    if (event.which !== 13) {
      return
    }
    input.disabled = true
    const line = document.createElement('div')
    line.className = 'BufferLine'
    line.textContent = 'You said: ' + input.value
    inner.appendChild(line)
    input.value = ''
    setTimeout(() => { input.disabled = false }, 10)
  })
</script>
</body>
</html>
"#;

const TESTS: &str = "\
* echo
Welcome
>hello
You said: hello
!You said: goodbye

* wrong kind
>{char} y
";

fn page_url(dir: &tempfile::TempDir) -> Url {
    let path = dir.path().join("echo.html");
    std::fs::write(&path, ECHO_PAGE).expect("failed to write page");
    Url::from_file_path(&path).expect("absolute path")
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn echo_transcript_passes() {
    let dir = tempfile::tempdir().unwrap();
    let file = TestFile::parse(TESTS);

    let browser = Chrome::launch(ChromeConfig::default())
        .await
        .expect("failed to launch");
    let (page, events) = browser.new_page().await.expect("failed to create page");
    let page = page.with_load_wait(QUICK_LOAD);

    let mut options = RunOptions::new(page_url(&dir));
    options.timeout = Duration::from_secs(5);
    let summary = Runner::new(&file, options, &page, &SilentReporter)
        .run(events, &["echo".to_string()])
        .await
        .expect("run failed");

    assert!(summary.passed(), "{summary:?}");
    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn kind_mismatch_is_reported_by_a_real_page() {
    let dir = tempfile::tempdir().unwrap();
    let file = TestFile::parse(TESTS);

    let browser = Chrome::launch(ChromeConfig::default())
        .await
        .expect("failed to launch");
    let (page, events) = browser.new_page().await.expect("failed to create page");
    let page = page.with_load_wait(QUICK_LOAD);

    let mut options = RunOptions::new(page_url(&dir));
    options.timeout = Duration::from_secs(5);
    let summary = Runner::new(&file, options, &page, &SilentReporter)
        .run(events, &["wrong kind".to_string()])
        .await
        .expect("run failed");

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.aborted.len(), 1);
    assert!(summary.aborted[0].reason.contains("not expecting char input"));
    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn observer_is_installed_in_new_documents() {
    let dir = tempfile::tempdir().unwrap();
    let browser = Chrome::launch(ChromeConfig::default())
        .await
        .expect("failed to launch");
    let (page, _events) = browser.new_page().await.expect("failed to create page");
    let page = page.with_load_wait(QUICK_LOAD);

    page.navigate(page_url(&dir).as_str())
        .await
        .expect("failed to navigate");
    let installed: bool = page
        .evaluate("typeof window.regtest_event === 'function'")
        .await
        .expect("evaluate failed");
    assert!(installed);

    browser.close().await.expect("failed to close");
}
