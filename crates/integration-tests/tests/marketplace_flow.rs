//! Integration tests for marketplace workflows.
//!
//! A farmer and a buyer share one data store, each with their own session,
//! the way two browsers would.

#![allow(clippy::unwrap_used)]

use farm_connect_core::{FarmerId, OrderStatus, PaymentMethod, Price, UserRole};
use farm_connect_integration_tests::{sign_up, test_state, test_store};
use farm_connect_marketplace::AppError;
use farm_connect_marketplace::config::{DelayConfig, Environment};
use farm_connect_marketplace::filter::ProductFilter;
use farm_connect_marketplace::models::{NewProduct, Product};
use farm_connect_marketplace::route::Route;
use farm_connect_marketplace::services::auth::{AuthError, AuthFlow, MOCK_OTP};
use farm_connect_marketplace::services::chat::ChatSession;
use farm_connect_marketplace::services::listings::ListingForm;
use farm_connect_marketplace::store::MockDataStore;

fn carrots_form() -> ListingForm {
    ListingForm {
        name: "Carrots".to_string(),
        description: "Crunchy orange carrots".to_string(),
        price: "2.25".to_string(),
        unit: "kg".to_string(),
        quantity: "40".to_string(),
        category: "Vegetables".to_string(),
        image: None,
    }
}

// =============================================================================
// Seed data
// =============================================================================

#[test]
fn test_seed_scenario() {
    let store = MockDataStore::for_environment(Environment::Production);
    assert_eq!(store.farmers().len(), 3);
    assert!(store.products().is_empty());
    assert!(store.orders().is_empty());

    let product = Product::new(NewProduct {
        name: "Free-range Eggs".to_string(),
        description: "A dozen brown eggs".to_string(),
        price: Price::parse_positive("6").unwrap(),
        unit: "dozen".to_string(),
        quantity_available: 30,
        image_url: String::new(),
        category: "Dairy & Eggs".to_string(),
        farmer_id: FarmerId::new("farmer1"),
    });
    store.add_product(product.clone());

    let found = store.filter_products(|p| p.farmer_id == FarmerId::new("farmer1"));
    assert_eq!(found, vec![product]);
}

#[test]
fn test_seed_portraits_carry_hint() {
    for farmer in test_store().farmers() {
        assert_eq!(
            farmer.profile_picture_url.as_deref(),
            Some("https://placehold.co/100x100.png\" data-ai-hint=\"farmer portrait")
        );
    }
}

#[test]
fn test_empty_filter_is_identity() {
    let store = test_store();
    let visitor = test_state(&store);
    store.add_product(Product::new(NewProduct {
        name: "Plums".to_string(),
        description: "Sweet plums".to_string(),
        price: Price::parse_positive("4").unwrap(),
        unit: "kg".to_string(),
        quantity_available: 3,
        image_url: String::new(),
        category: "Fruits".to_string(),
        farmer_id: FarmerId::new("farmer_unlisted"),
    }));

    let all = store.products();
    assert_eq!(ProductFilter::default().apply(&all, &store.farmers()), all);
    assert_eq!(visitor.catalog().home(&ProductFilter::default()).cards.len(), 1);
}

// =============================================================================
// OTP
// =============================================================================

#[tokio::test]
async fn test_otp_accepts_only_mock_code() {
    for phone in ["9876543210", "919876543210", "123456789012345"] {
        let state = test_state(&test_store());
        let auth = state.auth();
        let challenge = auth.request_otp(phone, AuthFlow::Signup).await.unwrap();

        assert!(matches!(
            auth.verify_otp(&challenge, "000000"),
            Err(AuthError::InvalidOtp)
        ));
        assert!(!state.session().is_authenticated());

        let redirect = auth.verify_otp(&challenge, MOCK_OTP).unwrap();
        assert_eq!(redirect.route, Route::Signup);
        assert_eq!(redirect.user.phone_number.as_str(), phone);
    }
}

#[tokio::test]
async fn test_login_flow_rejects_unknown_phone() {
    let state = test_state(&test_store());
    let err = state
        .auth()
        .request_otp("9876543210", AuthFlow::Login)
        .await
        .unwrap_err();
    let notice = AppError::from(err).notice();
    assert_eq!(notice.title, "Login Failed");
}

// =============================================================================
// Listing, checkout and dashboard
// =============================================================================

#[tokio::test]
async fn test_cash_on_delivery_end_to_end() {
    let store = test_store();
    let farmer_state = test_state(&store);
    let buyer_state = test_state(&store);

    let farmer = sign_up(&farmer_state, "9876543210", UserRole::Farmer, "Ravi", "Kumar")
        .await
        .unwrap();
    let buyer = sign_up(&buyer_state, "9123456789", UserRole::Buyer, "Meera", "Nair")
        .await
        .unwrap();

    let added = farmer_state
        .listings()
        .add_listing(carrots_form())
        .await
        .unwrap();
    assert_eq!(added.product.farmer_id, farmer.farmer_id());
    assert_eq!(added.product.image_url, "https://placehold.co/600x400.png");
    // Uploads are not configured, so only the confirmation is shown.
    assert_eq!(added.notices.len(), 1);

    let home = buyer_state.catalog().home(&ProductFilter {
        search_term: "CRUNCHY".to_string(),
        ..ProductFilter::default()
    });
    assert_eq!(home.cards.len(), 1);
    assert_eq!(home.cards[0].price_label, "₹2.25 / kg");
    assert_eq!(home.cards[0].farmer_name, "A Local Farmer");

    let outcome = buyer_state
        .checkout()
        .place_order(&added.product.id, PaymentMethod::CashOnDelivery)
        .unwrap();
    let order = outcome.order.unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.quantity_ordered, 1);
    assert_eq!(order.buyer_id, buyer.id);
    assert_eq!(order.buyer_name, "Meera Nair");
    assert_eq!(store.orders().len(), 1);

    // Stock is not decremented by orders.
    assert_eq!(
        store.find_product(&added.product.id).unwrap().quantity_available,
        40
    );

    let dashboard = farmer_state.listings().dashboard().unwrap();
    assert_eq!(dashboard.listings.len(), 1);
    assert_eq!(dashboard.orders.len(), 1);
    assert_eq!(dashboard.orders[0].order.id, order.id);
    assert_eq!(
        dashboard.orders[0].thumbnail_url,
        "https://placehold.co/600x400.png"
    );
}

#[tokio::test]
async fn test_non_cod_payment_records_nothing() {
    let store = test_store();
    let farmer_state = test_state(&store);
    let buyer_state = test_state(&store);
    sign_up(&farmer_state, "9876543210", UserRole::Farmer, "Ravi", "Kumar")
        .await
        .unwrap();
    sign_up(&buyer_state, "9123456789", UserRole::Buyer, "Meera", "Nair")
        .await
        .unwrap();
    let product = farmer_state
        .listings()
        .add_listing(carrots_form())
        .await
        .unwrap()
        .product;

    for method in [PaymentMethod::Upi, PaymentMethod::Card, PaymentMethod::InternetBanking] {
        let outcome = buyer_state.checkout().place_order(&product.id, method).unwrap();
        assert!(outcome.order.is_none());
        assert_eq!(outcome.notice.title, "Payment Method Selected (Mock)");
    }
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn test_role_gates() {
    let store = test_store();
    let buyer_state = test_state(&store);
    sign_up(&buyer_state, "9123456789", UserRole::Buyer, "Meera", "Nair")
        .await
        .unwrap();

    let err = buyer_state
        .listings()
        .add_listing(carrots_form())
        .await
        .unwrap_err();
    assert_eq!(err.redirect(), Some(Route::Home));
    assert_eq!(err.notice().title, "Access Denied");

    let anonymous = test_state(&store);
    let err = anonymous.listings().dashboard().unwrap_err();
    assert_eq!(err.redirect(), Some(Route::Login));
}

#[tokio::test]
async fn test_farmer_profile_pages() {
    let store = test_store();
    let farmer_state = test_state(&store);
    let farmer = sign_up(&farmer_state, "9876543210", UserRole::Farmer, "Ravi", "Kumar")
        .await
        .unwrap();
    farmer_state
        .listings()
        .add_listing(carrots_form())
        .await
        .unwrap();

    let own = farmer_state
        .catalog()
        .farmer_profile(&farmer.farmer_id())
        .unwrap();
    assert!(own.is_own);
    assert_eq!(own.name, "Ravi's Fields");
    assert_eq!(own.location, "4 Mill Road, Maharashtra, Pune, 411001");
    assert_eq!(own.listings.len(), 1);

    // Other visitors only see seed farmers.
    let visitor = test_state(&store);
    let err = visitor
        .catalog()
        .farmer_profile(&farmer.farmer_id())
        .unwrap_err();
    assert_eq!(err.notice().title, "Farmer Not Found");
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_with_seed_farmer() {
    let store = test_store();
    let buyer_state = test_state(&store);
    let buyer = sign_up(&buyer_state, "9123456789", UserRole::Buyer, "Meera", "Nair")
        .await
        .unwrap();
    let farmer = store.find_farmer(&FarmerId::new("farmer3")).unwrap();

    let mut chat = ChatSession::open(farmer, Some(buyer), DelayConfig::none());
    let pending = chat.send("Is the barley organic?").unwrap();
    assert!(chat.deliver(pending.resolve().await));

    let texts: Vec<&str> = chat.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "Hi there! You are now chatting with Golden Grain Fields.",
            "Is the barley organic?",
            "Thanks for your message! I'll get back to you soon regarding \
             \"Is the barley organi...\". (This is a mock reply)",
        ]
    );
}
