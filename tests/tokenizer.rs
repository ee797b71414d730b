use vce_reader::vce::formatting::tokenizer::ByteTokenizer;

const DELIMITERS: &[&[u8]] = &[b"\r\n", b") "];

fn pop_all(stream: &mut ByteTokenizer<'_>) -> Vec<Vec<u8>> {
    let mut tokens = Vec::new();
    while stream.has_value() {
        tokens.push(stream.pop().into_owned());
    }
    tokens
}

#[test]
fn splits_on_every_delimiter() {
    let mut stream = ByteTokenizer::new(b"one) two\r\nthree", DELIMITERS);
    let tokens = pop_all(&mut stream);
    assert_eq!(
        tokens,
        vec![
            b"one".to_vec(),
            b") ".to_vec(),
            b"two".to_vec(),
            b"\r\n".to_vec(),
            b"three".to_vec(),
        ]
    );
}

#[test]
fn peek_does_not_consume() {
    let mut stream = ByteTokenizer::new(b"head\r\ntail", DELIMITERS);
    assert_eq!(stream.peek(), b"head");
    assert_eq!(stream.peek(), b"head");
    assert_eq!(stream.pop().as_ref(), b"head");
    assert!(stream.next_is(b"\r\n"));
    assert!(!stream.next_is(b") "));
}

#[test]
fn adjacent_delimiters_are_separate_tokens() {
    let mut stream = ByteTokenizer::new(b"\r\n) \r\n", DELIMITERS);
    let tokens = pop_all(&mut stream);
    assert_eq!(tokens, vec![b"\r\n".to_vec(), b") ".to_vec(), b"\r\n".to_vec()]);
}

#[test]
fn declaration_order_breaks_ties_at_one_position() {
    const OVERLAPPING: &[&[u8]] = &[b"ab", b"abc"];
    let mut stream = ByteTokenizer::new(b"xabcx", OVERLAPPING);
    assert_eq!(stream.pop().as_ref(), b"x");
    assert_eq!(stream.pop().as_ref(), b"ab", "First declared delimiter must win");
    assert_eq!(stream.pop().as_ref(), b"cx");
}

#[test]
fn raw_reads_ignore_delimiters() {
    let mut data = b"len".to_vec();
    data.extend_from_slice(&(-2i32).to_le_bytes());
    data.extend_from_slice(b"\r\n) rest");
    let mut stream = ByteTokenizer::new(&data, DELIMITERS);

    assert_eq!(stream.read_bytes(3).unwrap().as_ref(), b"len");
    assert_eq!(stream.read_i32().unwrap(), -2);
    assert_eq!(stream.read_bytes(4).unwrap().as_ref(), b"\r\n) ");
    assert_eq!(stream.remaining(), b"rest");
    assert!(stream.read_bytes(5).is_err(), "Reading past the end must fail");
}

#[test]
fn push_back_rewinds_consumed_bytes() {
    let mut stream = ByteTokenizer::new(b"TPngImagewidth) x", DELIMITERS);
    let chunk = stream.pop();
    assert_eq!(chunk.as_ref(), b"TPngImagewidth");

    stream.push(&chunk[9..]);
    assert_eq!(stream.pop().as_ref(), b"width");
    assert_eq!(stream.pop().as_ref(), b") ");
}

#[test]
fn push_back_of_foreign_bytes_prepends() {
    let mut stream = ByteTokenizer::new(b"tail", DELIMITERS);
    stream.push(b"new) ");
    let tokens = pop_all(&mut stream);
    assert_eq!(tokens, vec![b"new".to_vec(), b") ".to_vec(), b"tail".to_vec()]);
}

#[test]
fn empty_input_has_no_value() {
    let mut stream = ByteTokenizer::new(b"", DELIMITERS);
    assert!(!stream.has_value());
    assert!(stream.peek().is_empty());
    assert!(stream.pop().is_empty());
}
