use rand::Rng;
use std::ptr::NonNull;
use tinypool::{PoolConfig, PoolError, TinyPool};
use tracing::{info, Level};

const ARENA_SIZE: usize = 32 * 1024;
const ROUNDS: usize = 10_000;

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let mut buffer = vec![0u8; ARENA_SIZE];
    let config = PoolConfig {
        align: 16,
        predict: true,
    };
    let mut pool = match TinyPool::with_config(&mut buffer, config) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("failed to build pool: {err}");
            return;
        }
    };

    let mut rng = rand::thread_rng();
    let mut live: Vec<NonNull<u8>> = Vec::new();
    let mut exhausted = 0;

    for _ in 0..ROUNDS {
        match rng.gen_range(0..10) {
            0..=4 => match pool.alloc(rng.gen_range(1..=256)) {
                Ok(ptr) => live.push(ptr),
                Err(PoolError::PoolExhausted) => exhausted += 1,
                Err(err) => panic!("unexpected alloc failure: {err}"),
            },
            5..=6 if !live.is_empty() => {
                let index = rng.gen_range(0..live.len());
                let size = rng.gen_range(1..=256);

                if let Ok(Some(ptr)) = pool.realloc(live[index].as_ptr(), size) {
                    live[index] = ptr;
                }
            }
            _ if !live.is_empty() => {
                let ptr = live.swap_remove(rng.gen_range(0..live.len()));

                if let Err(err) = pool.free(ptr.as_ptr()) {
                    panic!("free failed: {err}");
                }
            }
            _ => {}
        }
    }

    info!(live = live.len(), exhausted, "churn finished");
    println!("{}", pool.report());

    pool.destroy();
}
