use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

fn main() -> anyhow::Result<()> {
    let mut img = RgbImage::new(800, 600);

    // Dark gradient desk
    for y in 0..600 {
        for x in 0..800 {
            let r = (x * 60 / 800) as u8;
            let g = (y * 60 / 600) as u8;
            img.put_pixel(x, y, Rgb([r, g, 40]));
        }
    }

    // Card seen at a slight angle
    let card = [
        Point::new(170, 140),
        Point::new(620, 170),
        Point::new(600, 450),
        Point::new(150, 420),
    ];
    draw_polygon_mut(&mut img, &card, Rgb([235, 232, 220]));

    img.save("sample_card.png")?;
    println!("Created sample_card.png (800x600, card at an angle)");
    println!("Try: cargo run -- sample_card.png");
    Ok(())
}
