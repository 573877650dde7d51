use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

use depot_core::{CustomerId, InventoryItemId, ProductId, SaleOrderId, UserId, WarehouseId};
use depot_infra::ledger::InMemoryLedgerStore;
use depot_infra::services::{ExportSaleOrderItem, LedgerServices, PlaceOrder, ReceiveStock};
use depot_inventory::{allocate_fifo, LotBalance, StockReceipt};
use depot_products::NewProductPrice;
use depot_sales::{NewSaleOrder, OrderLine};

fn lots(count: i64) -> Vec<LotBalance> {
    (1..=count)
        .map(|id| LotBalance {
            lot_id: InventoryItemId::new(id),
            quantity_on_hand: Decimal::new(3, 0),
        })
        .collect()
}

fn seeded_services(rt: &Runtime, stock: i64) -> (LedgerServices<InMemoryLedgerStore>, WarehouseId) {
    let services = LedgerServices::new(InMemoryLedgerStore::new());
    let warehouse_id = WarehouseId::new();
    rt.block_on(async {
        services
            .pricing
            .set_price(
                NewProductPrice {
                    product_id: ProductId::new(1),
                    price: Decimal::new(10, 0),
                    currency_uom_id: "USD".to_string(),
                    effective_from: Utc::now() - Duration::hours(1),
                },
                UserId::new(),
                Utc::now(),
            )
            .await
            .unwrap();
        services
            .receiving
            .receive(ReceiveStock {
                receipt: StockReceipt {
                    product_id: ProductId::new(1),
                    warehouse_id,
                    quantity: Decimal::new(stock, 0),
                    unit_cost: Decimal::ONE,
                    currency_uom_id: "USD".to_string(),
                },
                received_at: Utc::now(),
            })
            .await
            .unwrap();
    });
    (services, warehouse_id)
}

fn one_unit_order(warehouse_id: WarehouseId) -> PlaceOrder {
    PlaceOrder {
        order: NewSaleOrder {
            customer_id: CustomerId::new(),
            warehouse_id,
            lines: vec![OrderLine {
                product_id: ProductId::new(1),
                quantity: Decimal::ONE,
            }],
            ship_to_address: "bench".to_string(),
            customer_store_id: None,
        },
        actor: UserId::new(),
        placed_at: Utc::now(),
    }
}

fn bench_fifo_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fifo_allocation");

    for lot_count in [1, 10, 100, 1000].iter() {
        let balances = lots(*lot_count);
        // Consume every lot but the last.
        let requested = Decimal::new(3 * (*lot_count - 1) + 1, 0);
        group.throughput(Throughput::Elements(*lot_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lot_count), lot_count, |b, _| {
            b.iter(|| allocate_fifo(black_box(&balances), black_box(requested)).unwrap());
        });
    }

    group.finish();
}

fn bench_reservation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("reservation");

    group.bench_function("place_single_line_order", |b| {
        let (services, warehouse_id) = seeded_services(&rt, 1_000_000_000);
        b.iter(|| {
            rt.block_on(services.reservation.place_order(one_unit_order(warehouse_id)))
                .unwrap()
        });
    });

    group.finish();
}

fn bench_reserve_and_export(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("reserve_and_export");

    group.bench_function("place_accept_export", |b| {
        let (services, warehouse_id) = seeded_services(&rt, 1_000_000_000);
        b.iter(|| {
            rt.block_on(async {
                let placed = services
                    .reservation
                    .place_order(one_unit_order(warehouse_id))
                    .await
                    .unwrap();
                let id: SaleOrderId = placed.order.id;
                services.orders.accept(id, Utc::now()).await.unwrap();
                services
                    .fulfillment
                    .export_item(ExportSaleOrderItem {
                        sale_order_id: id,
                        sale_order_seq: 0,
                        effective_from: Utc::now(),
                    })
                    .await
                    .unwrap()
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_fifo_allocation,
    bench_reservation,
    bench_reserve_and_export
);
criterion_main!(benches);
