// Server-rendered marketplace pages

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use reqwest::Url;

use crate::{
    AppState,
    error::AppError,
    filters::{FilterCriteria, FilterOverride, PaymentType, SortBy},
    models::{FilterOption, FilterOptions, Listing, ReviewSummary},
    presenter::{PageItem, group_thousands},
    routes::{api::wishlist_listings, requested_page},
    search::SearchSession,
    wishlist::{CookieStorage, WishlistStore},
};

// Only used to borrow `Url`'s form encoding for relative links
const LINK_BASE: &str = "http://localhost/";

// --- View models ---

pub struct CarCard {
    pub id: String,
    pub title: String,
    pub year: String,
    pub mileage: String,
    pub price: String,
    pub status: String,
    pub image: Option<String>,
    pub saved: bool,
}

impl CarCard {
    fn new(listing: &Listing, saved: bool) -> Self {
        CarCard {
            id: listing.id.clone(),
            title: listing.title(),
            year: listing.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
            mileage: listing.mileage.map(|m| format!("{} km", group_thousands(m))).unwrap_or_else(|| "-".into()),
            price: listing.price.map(group_thousands).unwrap_or_else(|| "Price on request".into()),
            status: listing.status_bucket().map(|b| b.to_string()).unwrap_or_default(),
            image: listing.images.first().cloned(),
            saved,
        }
    }
}

pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct SelectField {
    pub name: &'static str,
    pub label: &'static str,
    pub choices: Vec<Choice>,
}

impl SelectField {
    fn new(name: &'static str, label: &'static str, options: &[FilterOption], current: &str) -> Self {
        let choices = options
            .iter()
            .map(|option| Choice {
                value: option.value.clone(),
                label: option.label.clone(),
                selected: option.value == current,
            })
            .collect();
        SelectField { name, label, choices }
    }
}

pub struct PageLink {
    pub label: String,
    pub href: Option<String>,
    pub current: bool,
}

// Builds "/path?k=v&..." with proper form encoding
fn link(path: &str, pairs: &[(String, String)]) -> String {
    let Ok(mut url) = Url::parse(LINK_BASE).and_then(|base| base.join(path)) else {
        return path.to_string();
    };
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn form_value<'a>(pairs: &'a [(String, String)], key: &str) -> &'a str {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()).unwrap_or("")
}

fn filter_selects(options: &FilterOptions, form: &[(String, String)]) -> Vec<SelectField> {
    vec![
        SelectField::new("priceRange", "Price", &options.price_ranges, form_value(form, "priceRange")),
        SelectField::new("registrationRange", "Registration", &options.years, form_value(form, "registrationRange")),
        SelectField::new("mileageRange", "Mileage", &options.mileage_ranges, form_value(form, "mileageRange")),
        SelectField::new("fuelType", "Fuel", &options.fuel_types, form_value(form, "fuelType")),
        SelectField::new("vehicleType", "Body type", &options.vehicle_types, form_value(form, "vehicleType")),
    ]
}

fn page_links(window: &[PageItem], current: u32, form: &[(String, String)], sort_by: SortBy) -> Vec<PageLink> {
    window
        .iter()
        .map(|item| match item {
            PageItem::Page(number) => {
                let mut pairs = form.to_vec();
                pairs.push(("sortBy".into(), sort_by.as_str().into()));
                pairs.push(("page".into(), number.to_string()));
                PageLink {
                    label: number.to_string(),
                    href: Some(link("/cars", &pairs)),
                    current: *number == current,
                }
            }
            PageItem::Ellipsis => PageLink { label: "...".into(), href: None, current: false },
        })
        .collect()
}

fn render(template: impl Template, name: &str) -> Result<Html<String>, AppError> {
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render {} template: {}", name, e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate {
    selects: Vec<SelectField>,
    reviews: ReviewSummary,
    average_rating: String,
    wishlist_count: usize,
}

#[derive(Template)]
#[template(path = "cars.html")]
struct CarsTemplate {
    keyword: String,
    selects: Vec<SelectField>,
    features: Vec<Choice>,
    transmissions: Vec<Choice>,
    flags: Vec<Choice>,
    installment: bool,
    sort_links: Vec<PageLink>,
    cards: Vec<CarCard>,
    total_results: u32,
    pages: Vec<PageLink>,
    error: Option<String>,
    wishlist_count: usize,
}

#[derive(Template)]
#[template(path = "car_detail.html")]
struct CarDetailTemplate {
    card: CarCard,
    price_with_tax: Option<String>,
    specs: Vec<(&'static str, String)>,
    images: Vec<String>,
    features: Vec<String>,
    showrooms: Vec<String>,
    wishlist_count: usize,
}

#[derive(Template)]
#[template(path = "wishlist.html")]
struct WishlistTemplate {
    cards: Vec<CarCard>,
    wishlist_count: usize,
}

// --- Handlers ---

pub async fn landing_page(State(app_state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    let (options, reviews) = futures::join!(
        app_state.filter_options.get_or_load(&app_state.listings),
        app_state.listings.reviews(),
    );
    let reviews = reviews.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load reviews for landing page");
        Vec::new()
    });
    let reviews = ReviewSummary::new(reviews);

    let template = LandingTemplate {
        selects: filter_selects(&options, &[]),
        average_rating: reviews.average_rating.map(|r| format!("{r:.1}")).unwrap_or_default(),
        reviews,
        wishlist_count: WishlistStore::open(CookieStorage::new(jar)).len(),
    };
    render(template, "landing")
}

/// Seeds a search session from the query string (hero search, sidebar form or a
/// page link), fetches the requested page and renders it. Backend failures and
/// malformed ranges become an inline message over an empty result list.
pub async fn cars_page(
    State(app_state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let session = SearchSession::new(app_state.listings.clone(), app_state.settings.page_size);
    let seeded = match FilterOverride::from_pairs(&pairs) {
        Ok(overrides) => session.seed(overrides).await,
        Err(e) => Err(e),
    };

    let mut error = None;
    match seeded {
        Ok(()) => {
            session.set_page(requested_page(&pairs)).await;
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed search parameters");
            error = Some(e.to_string());
        }
    }

    let (options, state) = futures::join!(app_state.filter_options.get_or_load(&app_state.listings), session.snapshot());
    let wishlist = WishlistStore::open(CookieStorage::new(jar));
    let form = state.criteria.to_form_pairs();

    let template = CarsTemplate {
        keyword: state.criteria.keyword.clone(),
        selects: filter_selects(&options, &form),
        features: feature_choices(&options, &state.criteria),
        transmissions: transmission_choices(&state.criteria),
        flags: flag_choices(&state.criteria),
        installment: state.criteria.payment_type == PaymentType::Installment,
        sort_links: SortBy::ALL
            .iter()
            .map(|sort| {
                let mut sort_pairs = form.clone();
                sort_pairs.push(("sortBy".into(), sort.as_str().into()));
                PageLink {
                    label: sort_label(*sort).into(),
                    href: Some(link("/cars", &sort_pairs)),
                    current: *sort == state.criteria.sort_by,
                }
            })
            .collect(),
        cards: state.results.cars.iter().map(|car| CarCard::new(car, wishlist.contains(&car.id))).collect(),
        total_results: state.results.total_results,
        pages: page_links(&state.page_window(), state.page, &form, state.criteria.sort_by),
        error: error.or(state.error),
        wishlist_count: wishlist.len(),
    };
    render(template, "cars")
}

pub async fn car_detail_page(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let listing = app_state.listings.listing(&id).await?;
    let wishlist = WishlistStore::open(CookieStorage::new(jar));

    let spec = &listing.specification;
    let specs = [
        ("Engine", spec.engine.clone()),
        ("Transmission", spec.transmission.clone()),
        ("Fuel", spec.fuel_type.clone()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| (label, v)))
    .collect();

    let template = CarDetailTemplate {
        card: CarCard::new(&listing, wishlist.contains(&listing.id)),
        price_with_tax: listing.price_with_tax().map(group_thousands),
        specs,
        images: listing.images.clone(),
        features: listing.features.clone(),
        showrooms: listing.showrooms.iter().map(|s| s.name.clone()).collect(),
        wishlist_count: wishlist.len(),
    };
    render(template, "car detail")
}

pub async fn wishlist_page(State(app_state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    let wishlist = WishlistStore::open(CookieStorage::new(jar));
    let listings = wishlist_listings(&app_state.listings, wishlist.entries()).await;

    let template = WishlistTemplate {
        cards: listings.iter().map(|car| CarCard::new(car, true)).collect(),
        wishlist_count: wishlist.len(),
    };
    render(template, "wishlist")
}

/// Form fallback for the heart button: flips membership and goes back to the
/// page the visitor came from.
pub async fn toggle_wishlist(jar: CookieJar, Path(id): Path<String>, headers: HeaderMap) -> (CookieJar, Redirect) {
    let mut wishlist = WishlistStore::open(CookieStorage::new(jar));
    if wishlist.contains(&id) {
        wishlist.remove(&id);
    } else {
        wishlist.add(id);
    }

    let back = local_referer(&headers).unwrap_or_else(|| "/wishlist".to_string());
    (wishlist.into_storage().into_jar(), Redirect::to(&back))
}

// Path and query of the Referer, only when it points back at this host
fn local_referer(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let url = Url::parse(headers.get(header::REFERER)?.to_str().ok()?).ok()?;

    let authority = match (url.host_str(), url.port()) {
        (Some(name), Some(port)) => format!("{name}:{port}"),
        (Some(name), None) => name.to_string(),
        (None, _) => return None,
    };
    if !authority.eq_ignore_ascii_case(host) || url.path().starts_with("//") {
        return None;
    }

    Some(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

// --- Form helpers ---

fn feature_choices(options: &FilterOptions, criteria: &FilterCriteria) -> Vec<Choice> {
    options
        .features
        .iter()
        .filter(|option| !option.value.is_empty())
        .map(|option| Choice {
            value: option.value.clone(),
            label: option.label.clone(),
            selected: criteria.features.contains(&option.value),
        })
        .collect()
}

fn transmission_choices(criteria: &FilterCriteria) -> Vec<Choice> {
    let current = criteria.transmission.map(|t| t.as_str()).unwrap_or("");
    [("", "Any transmission"), ("Automatic", "Automatic"), ("Manual", "Manual")]
        .into_iter()
        .map(|(value, label)| Choice { value: value.into(), label: label.into(), selected: value == current })
        .collect()
}

fn flag_choices(criteria: &FilterCriteria) -> Vec<Choice> {
    [
        ("vatDeduction", "VAT deductible", criteria.vat_deduction),
        ("discountedCars", "Discounted", criteria.discounted_cars),
        ("premiumPartners", "Premium partners", criteria.premium_partners),
        ("driveType4x4", "4x4", criteria.drive_type_4x4),
    ]
    .into_iter()
    .map(|(value, label, selected)| Choice { value: value.into(), label: label.into(), selected })
    .collect()
}

fn sort_label(sort: SortBy) -> &'static str {
    match sort {
        SortBy::Newest => "Newest",
        SortBy::PriceAsc => "Price: low to high",
        SortBy::PriceDesc => "Price: high to low",
        SortBy::MileageAsc => "Mileage: low to high",
        SortBy::MileageDesc => "Mileage: high to low",
        SortBy::YearAsc => "Year: oldest first",
        SortBy::YearDesc => "Year: newest first",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn links_are_form_encoded() {
        let href = link("/cars", &pairs(&[("keyword", "golf gti"), ("features", "A&B")]));
        assert_eq!(href, "/cars?keyword=golf+gti&features=A%26B");
        assert_eq!(link("/cars", &[]), "/cars");
    }

    #[test]
    fn page_links_keep_criteria_and_mark_current() {
        let window = crate::presenter::page_window(2, 3);
        let form = pairs(&[("keyword", "audi")]);
        let links = page_links(&window, 2, &form, SortBy::PriceAsc);
        assert_eq!(links.len(), 3);
        assert!(links[1].current);
        assert_eq!(links[1].href.as_deref(), Some("/cars?keyword=audi&sortBy=price-asc&page=2"));
    }

    #[test]
    fn ellipsis_has_no_link() {
        let window = crate::presenter::page_window(5, 10);
        let links = page_links(&window, 5, &[], SortBy::Newest);
        assert!(links[1].href.is_none());
        assert_eq!(links[1].label, "...");
    }

    #[test]
    fn select_marks_current_token() {
        let options = vec![FilterOption::any("Any price"), FilterOption { value: "0-10000".into(), label: "Up to 10,000".into() }];
        let select = SelectField::new("priceRange", "Price", &options, "0-10000");
        assert!(!select.choices[0].selected);
        assert!(select.choices[1].selected);
    }

    fn referer_headers(host: &str, referer: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, host.parse().unwrap());
        headers.insert(header::REFERER, referer.parse().unwrap());
        headers
    }

    #[test]
    fn referer_on_this_host_is_followed() {
        let headers = referer_headers("localhost:3000", "http://localhost:3000/cars?keyword=golf&page=2");
        assert_eq!(local_referer(&headers).as_deref(), Some("/cars?keyword=golf&page=2"));
    }

    #[test]
    fn foreign_or_protocol_relative_referer_is_ignored() {
        let foreign = referer_headers("localhost:3000", "https://evil.example//phish.example/");
        assert_eq!(local_referer(&foreign), None);

        let sneaky = referer_headers("localhost:3000", "http://localhost:3000//phish.example/");
        assert_eq!(local_referer(&sneaky), None);

        let mut no_host = HeaderMap::new();
        no_host.insert(header::REFERER, "http://localhost:3000/cars".parse().unwrap());
        assert_eq!(local_referer(&no_host), None);
    }
}
