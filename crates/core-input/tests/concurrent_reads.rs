use core_input::{ChannelDevice, CursorPos, KeyStream};
use crossbeam_channel::unbounded;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until_blocked(stream: &KeyStream) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !stream.is_waiting() {
        assert!(Instant::now() < deadline, "background wait never started");
        thread::sleep(Duration::from_millis(1));
    }
}

fn send_later(tx: &crossbeam_channel::Sender<Vec<u8>>, bytes: &[u8]) -> thread::JoinHandle<()> {
    let tx = tx.clone();
    let bytes = bytes.to_vec();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        tx.send(bytes).unwrap();
    })
}

#[test]
fn read_key_receives_keys_from_inflight_wait() {
    let (tx, rx) = unbounded();
    let stream = Arc::new(KeyStream::new(ChannelDevice::new(rx)));
    let waiter = {
        let stream = stream.clone();
        thread::spawn(move || stream.wait_available_keys().unwrap())
    };
    wait_until_blocked(&stream);

    let sender = send_later(&tx, b"q");
    assert_eq!(stream.read_key().unwrap(), Some(('q', false)));
    sender.join().unwrap();

    tx.send(b"rest".to_vec()).unwrap();
    drop(tx);
    assert!(waiter.join().unwrap());
    assert!(stream.wait_available_keys().unwrap());
    let keys: String = std::iter::from_fn(|| stream.pop()).collect();
    assert_eq!(keys, "rest");
    assert!(!stream.wait_available_keys().unwrap());
}

#[test]
fn cursor_query_overlapping_wait_preserves_typed_keys() {
    let (tx, rx) = unbounded();
    let stream = Arc::new(KeyStream::new(ChannelDevice::new(rx)));
    let waiter = {
        let stream = stream.clone();
        thread::spawn(move || stream.wait_available_keys().unwrap())
    };
    wait_until_blocked(&stream);

    let sender = send_later(&tx, b"ab\x1b[3;4Rcd");
    assert_eq!(stream.get_cursor_pos(), Some(CursorPos { x: 4, y: 3 }));
    sender.join().unwrap();
    assert!(waiter.join().unwrap());

    let keys: String = std::iter::from_fn(|| stream.pop()).collect();
    assert_eq!(keys, "abcd");
}

#[test]
fn end_of_input_wakes_blocked_reader() {
    let (tx, rx) = unbounded::<Vec<u8>>();
    let stream = Arc::new(KeyStream::new(ChannelDevice::new(rx)));
    let waiter = {
        let stream = stream.clone();
        thread::spawn(move || stream.wait_available_keys().unwrap())
    };
    wait_until_blocked(&stream);
    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        drop(tx);
    });
    assert_eq!(stream.read_key().unwrap(), None);
    closer.join().unwrap();
    assert!(!waiter.join().unwrap());
}
