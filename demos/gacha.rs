use gachabox::{Category, Item, LotteryBox, Pickup, RatioMap, Tally, Weight, filter, ids};
use std::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Category)]
enum Rarity {
    N,
    R,
    SR,
    SSR,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Category)]
enum Element {
    Blaze,
    Water,
    Forest,
    Light,
    Dark,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Category)]
enum Series {
    Launch,
    Olympus,
    Japanese,
    Nordic,
    Grimm,
    #[label("Fes")]
    Festival,
}

#[derive(Clone, Debug)]
struct Card {
    id: u32,
    rarity: Rarity,
    series: Series,
    element: Element,
}

impl Card {
    fn name(&self) -> String {
        format!(
            "{:>3}-{}-{}-{}",
            self.id,
            self.series.name(),
            self.rarity.name(),
            self.element.name()
        )
    }
}

impl Item for Card {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

/// Issues card ids from its own counter.
#[derive(Default)]
struct CardFactory {
    next_id: u32,
}

impl CardFactory {
    fn sets(&mut self, sets: usize, rarity: Rarity, series: Series) -> Vec<Card> {
        let mut cards = Vec::new();
        for _ in 0..sets {
            for &element in Element::ALL {
                self.next_id += 1;
                cards.push(Card {
                    id: self.next_id,
                    rarity,
                    series,
                    element,
                });
            }
        }
        cards
    }
}

const DRAWS: usize = 1_000_000;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut factory = CardFactory::default();
    let mut all_cards = Vec::new();
    all_cards.extend(factory.sets(8, Rarity::N, Series::Launch));
    all_cards.extend(factory.sets(8, Rarity::R, Series::Launch));
    all_cards.extend(factory.sets(4, Rarity::SR, Series::Launch));
    all_cards.extend(factory.sets(2, Rarity::SSR, Series::Launch));
    for series in [Series::Olympus, Series::Japanese, Series::Nordic, Series::Grimm, Series::Festival] {
        all_cards.extend(factory.sets(1, Rarity::SSR, series));
    }

    let series = |c: &Card| c.series;
    let rarity = |c: &Card| c.rarity;
    let fes_cards = filter(&all_cards, series, &[Series::Festival]);
    let cards: Vec<&Card> = all_cards.iter().filter(|c| c.series != Series::Festival).collect();
    let grimm_cards = filter(cards.iter().copied(), series, &[Series::Grimm]);

    let free: RatioMap<Rarity> = "N=79, R=20, SR=1".parse()?;
    let rare: RatioMap<Rarity> = "R=79, SR=20, SSR=1".parse()?;
    let sr_or_better: RatioMap<Rarity> = "SR=95, SSR=5".parse()?;
    let hundred = Weight::integer(100)?;
    for ratio in [&free, &rare, &sr_or_better] {
        ratio.expect_total(hundred)?;
    }

    let five = Weight::integer(5)?;
    let new_series =
        Pickup::new(ids(grimm_cards.iter().copied()), five).apply(cards.iter().copied(), rarity)?;
    let with_fes: Vec<&Card> = cards.iter().chain(fes_cards.iter()).copied().collect();
    let festival = Pickup::new(ids(fes_cards.iter().copied()), five).apply(with_fes, rarity)?;
    let blaze = filter(cards.iter().copied(), |c: &Card| c.element, &[Element::Blaze]);

    lottery_test("Free", &cards, &free)?;
    lottery_test("Rare", &cards, &rare)?;
    lottery_test("SSR rate up", &cards, &rare.boost(Rarity::SSR, Weight::integer(2)?)?)?;
    lottery_test("Element", &blaze, &rare)?;
    lottery_test("New series pickup", &new_series, &rare)?;
    lottery_test("Festival pickup", &festival, &rare)?;
    lottery_test("SR or better", &cards, &sr_or_better)?;

    Ok(())
}

fn lottery_test(
    title: &str,
    cards: &[&Card],
    ratio: &RatioMap<Rarity>,
) -> Result<(), Box<dyn Error>> {
    let rarity = |c: &Card| c.rarity;
    let lottery = LotteryBox::build(cards.iter().copied(), ratio, rarity)?;
    print_tally(&format!("{title}: stated rates ({ratio})"), &lottery.tally(rarity), cards);

    let mut rng = rand::rng();
    let draws = lottery.draw(&mut rng, DRAWS);
    print_tally(&format!("{title}: {DRAWS} draws"), &Tally::from_items(draws, rarity), cards);
    Ok(())
}

fn print_tally(title: &str, tally: &Tally<Rarity, u32>, cards: &[&Card]) {
    println!("{title}");
    for (rarity, count) in tally.categories() {
        println!("{:>9} {:>8.3}% {}", count, tally.percent(rarity), rarity.name());
    }

    let mut seen: Vec<&Card> = cards.to_vec();
    seen.sort_by_key(|c| c.id);
    seen.dedup_by_key(|c| c.id);
    for card in seen {
        let count = tally.item_count(&card.id);
        if count > 0 {
            println!("{:>9} {:>8.3}% {}", count, tally.item_percent(&card.id), card.name());
        }
    }
    println!();
}
