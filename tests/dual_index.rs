//! Property tests for the subscription dual index.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use command_hub::{Connection, ConnectionKey, Notifier, Subscriptions, notifier_fn};
use common::RecordingConnection;
use proptest::prelude::*;

const CONNECTIONS: usize = 4;
const COMMANDS: [&str; 3] = ["tick", "news", "prices"];

#[derive(Debug, Clone)]
enum Op {
    Subscribe(usize, usize),
    DelCon(usize),
    DelConCmd(usize, usize),
    Update(usize, usize, u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..CONNECTIONS, 0..COMMANDS.len()).prop_map(|(k, c)| Op::Subscribe(k, c)),
        1 => (0..CONNECTIONS).prop_map(Op::DelCon),
        2 => (0..CONNECTIONS, 0..COMMANDS.len()).prop_map(|(k, c)| Op::DelConCmd(k, c)),
        1 => (0..CONNECTIONS, 0..COMMANDS.len(), any::<u8>()).prop_map(|(k, c, v)| Op::Update(k, c, v)),
    ]
}

fn noop() -> Arc<dyn Notifier<u8>> {
    notifier_fn(|_, _: u8| async { Ok(Bytes::new()) })
}

proptest! {
    #[test]
    fn indices_stay_consistent(ops in proptest::collection::vec(op(), 0..64)) {
        let subs: Subscriptions<u8> = Subscriptions::new();
        let conns: Vec<Arc<dyn Connection>> = (0..CONNECTIONS)
            .map(|_| RecordingConnection::new() as Arc<dyn Connection>)
            .collect();
        let mut model: BTreeSet<(usize, usize)> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Subscribe(k, c) => {
                    subs.subscribe_cmd(&conns[k], COMMANDS[c], 0, noop());
                    model.insert((k, c));
                }
                Op::DelCon(k) => {
                    let expected = model.iter().filter(|(mk, _)| *mk == k).count();
                    prop_assert_eq!(subs.del_con(&conns[k]), expected);
                    model.retain(|(mk, _)| *mk != k);
                }
                Op::DelConCmd(k, c) => {
                    prop_assert_eq!(subs.del_con_cmd(&conns[k], COMMANDS[c]), model.remove(&(k, c)));
                }
                Op::Update(k, c, v) => {
                    subs.update_data(&conns[k], COMMANDS[c], v);
                    if model.contains(&(k, c)) {
                        prop_assert_eq!(subs.data(&conns[k], COMMANDS[c]), Some(v));
                    } else {
                        prop_assert_eq!(subs.data(&conns[k], COMMANDS[c]), None);
                    }
                }
            }

            prop_assert_eq!(subs.len(), model.len());

            for (k, conn) in conns.iter().enumerate() {
                let key = ConnectionKey::of(conn);
                let forward: BTreeSet<String> = subs.subscriptions_of(conn).into_iter().collect();

                for (c, command) in COMMANDS.iter().enumerate() {
                    let reverse = subs
                        .subscribers(command)
                        .iter()
                        .any(|sub| ConnectionKey::of(sub) == key);
                    prop_assert_eq!(forward.contains(*command), reverse);
                    prop_assert_eq!(reverse, model.contains(&(k, c)));
                    prop_assert_eq!(subs.exists(conn, command), reverse);
                }
            }

            let live: BTreeSet<String> = subs.commands().into_iter().collect();
            let expected: BTreeSet<String> = model
                .iter()
                .map(|(_, c)| COMMANDS[*c].to_string())
                .collect();
            prop_assert_eq!(live, expected);

            let connected: BTreeSet<usize> = model.iter().map(|(k, _)| *k).collect();
            prop_assert_eq!(subs.connection_count(), connected.len());
        }
    }
}

#[test]
fn test_del_con_without_pairings_is_noop() {
    let subs: Subscriptions<u8> = Subscriptions::new();
    let conn = RecordingConnection::new() as Arc<dyn Connection>;
    assert_eq!(subs.del_con(&conn), 0);
    assert!(subs.is_empty());
}

#[test]
fn test_last_unsubscribe_collects_command() {
    let subs: Subscriptions<u8> = Subscriptions::new();
    let a = RecordingConnection::new() as Arc<dyn Connection>;
    let b = RecordingConnection::new() as Arc<dyn Connection>;

    subs.subscribe_cmd(&a, "tick", 1, noop());
    subs.subscribe_cmd(&b, "tick", 2, noop());
    assert_eq!(subs.commands(), ["tick"]);

    subs.del_con(&a);
    assert_eq!(subs.commands(), ["tick"]);
    subs.del_con_cmd(&b, "tick");
    assert!(subs.commands().is_empty());
    assert_eq!(subs.connection_count(), 0);
}
