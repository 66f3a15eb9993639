use std::io::Write;

use engine_logging::LogBuffer;

#[test]
fn writes_are_split_into_complete_lines() {
    let buffer = LogBuffer::new();
    let mut writer = buffer.clone();

    writer.write_all(b"first line\nsecond ").unwrap();
    assert_eq!(buffer.lines(), vec!["first line".to_string()]);

    writer.write_all(b"half\n").unwrap();
    assert_eq!(
        buffer.lines(),
        vec!["first line".to_string(), "second half".to_string()]
    );
}

#[test]
fn clones_share_the_same_buffer() {
    let buffer = LogBuffer::new();
    let other = buffer.clone();
    other.push_line("from clone");

    assert_eq!(buffer.len(), 1);
    assert!(!buffer.is_empty());
}

#[test]
fn global_buffer_is_a_singleton() {
    let a = LogBuffer::global();
    let before = a.len();
    LogBuffer::global().push_line("diagnostic");
    assert_eq!(a.len(), before + 1);
}
