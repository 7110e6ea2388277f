//! Benchmarks for key event translation
//!
//! Measures the per-event cost of the key table, which runs for every key
//! transition a display reports.
//!
//! Run with: cargo bench key_events

use brlkeys::keytable::{load_default_key_table, parse_key_table_yaml, KeyEvent, KeyTable};
use divan::{black_box, Bencher};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn default_table() -> KeyTable {
    load_default_key_table().instantiate()
}

/// A table with many routing key bindings under several modifiers
fn wide_table(modifiers: usize) -> KeyTable {
    let keys: String = (0..modifiers)
        .map(|i| format!("  M{}: {}\n", i, i))
        .collect();
    let bindings: String = (0..modifiers)
        .map(|i| {
            let combination: Vec<String> = (0..=i).map(|m| format!("M{}", m)).collect();
            format!(
                "      - keys: \"{}+!RoutingKey\"\n        command: ROUTE+{}\n",
                combination.join("+"),
                i
            )
        })
        .collect();
    let yaml = format!(
        "keys:\n{}groups:\n  RoutingKey: 1\ncontexts:\n  - id: 0\n    bindings:\n{}",
        keys, bindings
    );

    parse_key_table_yaml(&yaml)
        .map(|definition| definition.instantiate())
        .unwrap_or_else(|_| KeyTable::new(Vec::new()))
}

// ============================================================================
// Single key events
// ============================================================================

#[divan::bench]
fn immediate_key_press_release(bencher: Bencher) {
    let mut table = default_table();
    let mut queue = Vec::with_capacity(4);

    bencher.bench_local(|| {
        queue.clear();
        table.process_key_event(black_box(KeyEvent::press(0, 11)), &mut queue);
        table.process_key_event(black_box(KeyEvent::release(0, 11)), &mut queue);
        black_box(queue.len())
    });
}

#[divan::bench]
fn hotkey_press(bencher: Bencher) {
    let mut table = default_table();
    let mut queue = Vec::with_capacity(4);

    bencher.bench_local(|| {
        queue.clear();
        table.process_key_event(black_box(KeyEvent::press(0, 10)), &mut queue);
        black_box(queue.len())
    });
}

#[divan::bench]
fn keyboard_chord(bencher: Bencher) {
    let mut table = default_table();
    let mut queue = Vec::with_capacity(16);
    let dots = [0u8, 1, 3, 4];

    bencher.bench_local(|| {
        queue.clear();
        for dot in dots {
            table.process_key_event(KeyEvent::press(0, dot), &mut queue);
        }
        for dot in dots {
            table.process_key_event(KeyEvent::release(0, dot), &mut queue);
        }
        black_box(queue.len())
    });
}

// ============================================================================
// Modifier depth
// ============================================================================

#[divan::bench(args = [1, 4, 10])]
fn routing_key_under_modifiers(bencher: Bencher, modifiers: usize) {
    let mut table = wide_table(modifiers);
    let mut queue = Vec::with_capacity(16);
    let held: Vec<u8> = (0..modifiers as u8).collect();

    bencher.bench_local(|| {
        queue.clear();
        for code in &held {
            table.process_key_event(KeyEvent::press(0, *code), &mut queue);
        }
        table.process_key_event(KeyEvent::press(1, 40), &mut queue);
        table.process_key_event(KeyEvent::release(1, 40), &mut queue);
        for code in &held {
            table.process_key_event(KeyEvent::release(0, *code), &mut queue);
        }
        black_box(queue.len())
    });
}

#[divan::bench]
fn compile_default_table() -> KeyTable {
    default_table()
}
