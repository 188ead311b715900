//! Embedded entry point - nRF52840 + Embassy.
//!
//! Task layout mirrors the concurrency model of the core: the gesture
//! task runs on a higher-priority interrupt executor so its 20 ms
//! button poll preempts UI work; the touch task owns the display and
//! the transducer on the thread executor; a small GPIO task forwards
//! the touch-down edge into the shared wake signal. The two bounded
//! channels are the only paths between the actors.

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

use defmt::{info, unwrap, warn};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Flex, Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::pac::interrupt;
use embassy_nrf::{bind_interrupts, peripherals, spim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration, Instant, Ticker, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ILI9341Rgb565;
use static_cell::StaticCell;

use zonelight::bank::driver::BankDriver;
use zonelight::config::{
    CHANNEL_DEPTH, DUTY_A_DEFAULT, DUTY_B_DEFAULT, POLL_PERIOD_MS, TOUCH_SAMPLE_MS,
};
use zonelight::error::Error;
use zonelight::gesture::{Effect, Effects, Engine};
use zonelight::hw::display::render;
use zonelight::hw::port::TwoWirePort;
use zonelight::hw::touch::TouchTransducer;
use zonelight::message::{ControlMsg, NotifyMsg};
use zonelight::touch::{Layout, TouchController, TouchSample};

bind_interrupts!(struct Irqs {
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<peripherals::SPI2>;
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
});

/// Touch actor -> gesture actor.
static CONTROL: Channel<CriticalSectionRawMutex, ControlMsg, CHANNEL_DEPTH> = Channel::new();

/// Gesture actor -> touch actor.
static NOTIFY: Channel<CriticalSectionRawMutex, NotifyMsg, CHANNEL_DEPTH> = Channel::new();

/// Single-slot wake for the touch actor. Last wake wins - the touch
/// task re-drains NOTIFY on every wake instead of counting signals.
static TOUCH_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI1_EGU1() {
    EXECUTOR_HIGH.on_interrupt()
}

type TouchSpi = ExclusiveDevice<spim::Spim<'static, peripherals::SPI2>, Output<'static>, Delay>;
type DisplaySpi = ExclusiveDevice<spim::Spim<'static, peripherals::SPI3>, Output<'static>, Delay>;
type Panel = mipidsi::Display<
    SpiInterface<'static, DisplaySpi, Output<'static>>,
    ILI9341Rgb565,
    Output<'static>,
>;

#[embassy_executor::task]
async fn gesture_task(mut bank: BankDriver<TwoWirePort>) -> ! {
    if let Err(e) = bank.set_duty(DUTY_A_DEFAULT, DUTY_B_DEFAULT) {
        warn!("duty init failed: {}", e);
    }
    let mut engine = Engine::new();
    let mut ticker = Ticker::every(Duration::from_millis(POLL_PERIOD_MS));
    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();
        while let Ok(msg) = CONTROL.try_receive() {
            run_effects(&mut bank, engine.handle_control(msg, now_ms));
        }
        let buttons = match bank.read_buttons() {
            Ok(bits) => Some(bits),
            Err(e) => {
                // One lost poll; the next cycle starts from scratch.
                warn!("button read aborted: {}", e);
                None
            }
        };
        run_effects(&mut bank, engine.tick(buttons, now_ms));
    }
}

fn run_effects(bank: &mut BankDriver<TwoWirePort>, fx: Effects) {
    for effect in fx {
        match effect {
            Effect::WriteBank(state) => {
                if let Err(e) = bank.write_state(state) {
                    warn!("bank write dropped: {}", e);
                }
            }
            Effect::Notify(msg) => {
                if NOTIFY.try_send(msg).is_err() {
                    warn!("{}: dropping {}", Error::QueueOverflow, msg);
                }
                TOUCH_WAKE.signal(());
            }
            Effect::FlushControl => while CONTROL.try_receive().is_ok() {},
        }
    }
}

#[embassy_executor::task]
async fn touch_task(mut transducer: TouchTransducer<TouchSpi>, mut display: Panel) -> ! {
    let layout = Layout::portrait_qvga();
    let mut ui = TouchController::new(layout);
    loop {
        if ui.is_tracking() {
            Timer::after_millis(TOUCH_SAMPLE_MS).await;
        } else {
            // The periodic arm keeps the preset and banner timers
            // honest while the panel is untouched.
            match select(TOUCH_WAKE.wait(), Timer::after_millis(100)).await {
                Either::First(()) => ui.on_wake(),
                Either::Second(()) => {}
            }
        }

        // Wakes are overloaded (touch edge or forced state), so
        // notifications always drain before samples are trusted.
        while let Ok(msg) = NOTIFY.try_receive() {
            send_all(ui.on_notify(msg)).await;
        }

        let now_ms = Instant::now().as_millis();
        send_all(ui.poll(now_ms)).await;

        if ui.is_tracking() {
            let sample = transducer.sample().unwrap_or(TouchSample::released());
            send_all(ui.on_sample(sample, now_ms)).await;
        }

        if render(&mut display, &layout, ui.view()).is_err() {
            warn!("display draw failed");
        }
    }
}

/// Blocking sends from task context; the queue is bounded and the
/// gesture task drains it every poll.
async fn send_all(cmds: zonelight::touch::Commands) {
    for cmd in cmds {
        CONTROL.send(cmd).await;
    }
}

#[embassy_executor::task]
async fn touch_irq_task(mut irq: Input<'static>) -> ! {
    loop {
        irq.wait_for_falling_edge().await;
        TOUCH_WAKE.signal(());
        irq.wait_for_rising_edge().await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("zonelight starting");

    // Bank expander on a bit-banged two-wire link.
    let port = TwoWirePort::new(Flex::new(p.P0_27), Flex::new(p.P0_26));
    let bank = BankDriver::new(port);

    // Touch transducer on SPI2.
    let mut touch_cfg = spim::Config::default();
    touch_cfg.frequency = spim::Frequency::M1;
    let touch_spi = spim::Spim::new(p.SPI2, Irqs, p.P0_31, p.P0_30, p.P0_29, touch_cfg);
    let touch_cs = Output::new(p.P0_28, Level::High, OutputDrive::Standard);
    let transducer = match ExclusiveDevice::new(touch_spi, touch_cs, Delay) {
        Ok(dev) => TouchTransducer::new(dev),
        Err(_) => defmt::panic!("touch spi setup failed"),
    };

    // QVGA panel on SPI3.
    let mut lcd_cfg = spim::Config::default();
    lcd_cfg.frequency = spim::Frequency::M32;
    let lcd_spi = spim::Spim::new(p.SPI3, Irqs, p.P1_15, p.P1_14, p.P1_13, lcd_cfg);
    let lcd_cs = Output::new(p.P1_12, Level::High, OutputDrive::Standard);
    let lcd_dc = Output::new(p.P1_11, Level::Low, OutputDrive::Standard);
    let lcd_rst = Output::new(p.P1_10, Level::High, OutputDrive::Standard);
    static DISPLAY_BUF: StaticCell<[u8; 512]> = StaticCell::new();
    let lcd_dev = match ExclusiveDevice::new(lcd_spi, lcd_cs, Delay) {
        Ok(dev) => dev,
        Err(_) => defmt::panic!("display spi setup failed"),
    };
    let interface = SpiInterface::new(lcd_dev, lcd_dc, DISPLAY_BUF.init([0; 512]));
    let display = match mipidsi::Builder::new(ILI9341Rgb565, interface)
        .reset_pin(lcd_rst)
        .init(&mut Delay)
    {
        Ok(d) => d,
        Err(_) => defmt::panic!("display init failed"),
    };

    let touch_irq = Input::new(p.P0_02, Pull::Up);

    // The gesture actor preempts the UI: it runs on its own
    // interrupt-driven executor at a higher priority.
    embassy_nrf::interrupt::SWI1_EGU1.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(embassy_nrf::interrupt::SWI1_EGU1);
    unwrap!(high.spawn(gesture_task(bank)));

    unwrap!(spawner.spawn(touch_irq_task(touch_irq)));
    unwrap!(spawner.spawn(touch_task(transducer, display)));
}
