use alloy_primitives::{Address, U256, address};
use criterion::{Criterion, criterion_group, criterion_main};
use flash_arb::{ArbitrageEvaluator, EvaluatorConfig, Fee, Market, Pool, PoolWrapper, ReserveObservation, SwapPath, Token};
use lazy_static::lazy_static;
use std::hint::black_box;
use std::sync::Arc;

lazy_static! {
    static ref WBNB: Arc<Token> = Arc::new(Token::new_with_data(
        address!("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
        Some("WBNB".to_string()),
        None,
        Some(18)
    ));
    static ref USDT: Arc<Token> = Arc::new(Token::new_with_data(
        address!("0x55d398326f99059fF775485246999027B3197955"),
        Some("USDT".to_string()),
        None,
        Some(18)
    ));
    static ref CAKE: Arc<Token> = Arc::new(Token::new_with_data(
        address!("0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82"),
        Some("CAKE".to_string()),
        None,
        Some(18)
    ));
}

const E18: u128 = 1_000_000_000_000_000_000;

fn create_pool(token0: &Arc<Token>, token1: &Arc<Token>, reserve0: u128, reserve1: u128) -> PoolWrapper {
    let pool = Pool::new(Address::random(), token0.clone(), token1.clone(), Fee::default())
        .unwrap()
        .with_reserves(U256::from(reserve0 * E18), U256::from(reserve1 * E18));
    PoolWrapper::from(pool)
}

fn create_evaluator() -> ArbitrageEvaluator {
    let borrow_pool = create_pool(&WBNB, &USDT, 10_000, 3_000_000);
    let wbnb_cake = create_pool(&WBNB, &CAKE, 10_000, 1_500_000);
    let cake_usdt = create_pool(&CAKE, &USDT, 1_500_000, 3_300_000);

    let path = SwapPath::new(vec![WBNB.clone(), CAKE.clone(), USDT.clone()], vec![wbnb_cake, cake_usdt]).unwrap();
    ArbitrageEvaluator::new("wbnb-cake-usdt", borrow_pool, &WBNB, path, EvaluatorConfig::default()).unwrap()
}

fn benchmark_recalculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");

    let mut evaluator = create_evaluator();
    group.bench_function("recalculate_two_hops", |b| b.iter(|| black_box(evaluator.recalculate().is_some())));

    let mut market = Market::new();
    let evaluator = create_evaluator();
    let borrow_pool = market.add_pool(evaluator.get_borrow_pool().clone());
    for pool in evaluator.get_swap_path().pools.iter() {
        market.add_pool(pool.clone());
    }
    market.add_evaluator(evaluator).unwrap();

    let mut block = 0u64;
    group.bench_function("apply_changed_observation", |b| {
        b.iter(|| {
            block += 1;
            let reserve0 = U256::from(10_000 * E18 + block as u128);
            let observation = ReserveObservation::new(borrow_pool.get_address(), reserve0, U256::from(3_000_000 * E18), block);
            black_box(market.apply_observation(&observation).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_recalculate);
criterion_main!(benches);
